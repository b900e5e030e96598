//! Illustrative whiteboard image for a lesson.

use crate::defaults::WHITEBOARD_CONTEXT_CHARS;
use crate::error::{LessonError, Result};

const DEFAULT_IMAGE_MIME: &str = "image/png";

/// Base64 image payload returned by an image backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

impl InlineImage {
    /// `data:` URL usable directly as an image source.
    pub fn to_data_url(&self) -> String {
        let mime = if self.mime_type.is_empty() {
            DEFAULT_IMAGE_MIME
        } else {
            &self.mime_type
        };
        format!("data:{};base64,{}", mime, self.data)
    }
}

/// Trait for the external image-generation capability.
#[async_trait::async_trait]
pub trait ImageBackend: Send + Sync {
    /// Generate an image for `prompt`; `None` when the response had no image.
    async fn generate_image(&self, prompt: &str) -> Result<Option<InlineImage>>;
}

/// Build the whiteboard prompt from the lesson summary.
///
/// Only the first 500 characters of context are used. An instructor's
/// adjustment request is appended verbatim.
pub fn whiteboard_prompt(summary_context: &str, adjustment: Option<&str>) -> String {
    let context: String = summary_context
        .chars()
        .take(WHITEBOARD_CONTEXT_CHARS)
        .collect();

    let mut prompt = format!(
        "Photograph of a classroom whiteboard set up before a flight-training lesson.\n\
         Lesson context: {context}\n\
         Show hand-drawn diagrams in black, red and blue marker. \
         Leave parts of the board unfinished, with some labels left as blank lines \
         for the instructor to fill in during class.\n\
         Keep it technical, clear and professional."
    );

    if let Some(adjustment) = adjustment.map(str::trim).filter(|a| !a.is_empty()) {
        prompt.push_str(&format!("\n\nInstructor adjustment: \"{adjustment}\". Apply it."));
    }

    prompt
}

/// Generate the whiteboard image and return it as a data URL.
pub async fn render_whiteboard(
    backend: &dyn ImageBackend,
    summary_context: &str,
    adjustment: Option<&str>,
) -> Result<String> {
    let prompt = whiteboard_prompt(summary_context, adjustment);
    match backend.generate_image(&prompt).await? {
        Some(image) if !image.data.is_empty() => Ok(image.to_data_url()),
        _ => Err(LessonError::NoImageReturned),
    }
}
