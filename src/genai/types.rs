//! Wire types for the `generateContent` REST endpoint.
//!
//! Kept free of HTTP so request building and response interpretation can be
//! tested without a network.

use crate::error::LessonError;
use crate::genai::prompts;
use crate::whiteboard::InlineImage;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    pub fn inline(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime_type.into(),
                data: STANDARD.encode(bytes),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default)]
    pub mime_type: String,
    /// Base64 payload.
    #[serde(default)]
    pub data: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_config: Option<SpeechConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_config: Option<ImageConfig>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechConfig {
    pub voice_config: VoiceConfig,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceConfig {
    pub prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrebuiltVoiceConfig {
    pub voice_name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    pub aspect_ratio: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

impl GenerateContentResponse {
    fn parts(&self) -> impl Iterator<Item = &Part> {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|c| c.parts.iter())
    }

    /// First inline payload across all candidates.
    pub fn first_inline_data(&self) -> Option<&InlineData> {
        self.parts()
            .filter_map(|p| p.inline_data.as_ref())
            .find(|d| !d.data.is_empty())
    }

    /// Concatenated text of the first candidate.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }

    pub fn first_image(&self) -> Option<InlineImage> {
        self.first_inline_data().map(|d| InlineImage {
            mime_type: d.mime_type.clone(),
            data: d.data.clone(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// Map a failed HTTP exchange onto the error taxonomy.
///
/// Throttling is recognized by HTTP 429, an error body code of 429, the
/// `RESOURCE_EXHAUSTED` status, or `429` in the message.
pub fn classify_error(http_status: u16, body: &str) -> LessonError {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error)
        .unwrap_or_default();

    let message = if parsed.message.is_empty() {
        body.trim().to_string()
    } else {
        parsed.message
    };

    let rate_limited = http_status == 429
        || parsed.code == 429
        || parsed.status == "RESOURCE_EXHAUSTED"
        || message.contains("429");

    if rate_limited {
        LessonError::RateLimited { message }
    } else {
        LessonError::Api {
            status: http_status,
            message,
        }
    }
}

/// Lesson material handed to the generative service.
///
/// Text extraction (e.g. from slides) happens upstream; documents the service
/// can read natively are passed as inline bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LessonDocument {
    Text(String),
    Inline { mime_type: String, bytes: Vec<u8> },
}

impl LessonDocument {
    pub fn pdf(bytes: Vec<u8>) -> Self {
        LessonDocument::Inline {
            mime_type: "application/pdf".to_string(),
            bytes,
        }
    }

    fn to_part(&self) -> Part {
        match self {
            LessonDocument::Text(text) => Part::text(format!("Lesson material:\n\n{text}")),
            LessonDocument::Inline { mime_type, bytes } => Part::inline(mime_type.clone(), bytes),
        }
    }
}

fn single_turn(parts: Vec<Part>, config: Option<GenerationConfig>) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content { parts, role: None }],
        generation_config: config,
    }
}

/// Audio-only request narrated by a prebuilt voice.
pub fn speech_request(text: &str, voice: &str) -> GenerateContentRequest {
    single_turn(
        vec![Part::text(text)],
        Some(GenerationConfig {
            response_modalities: Some(vec!["AUDIO".to_string()]),
            speech_config: Some(SpeechConfig {
                voice_config: VoiceConfig {
                    prebuilt_voice_config: PrebuiltVoiceConfig {
                        voice_name: voice.to_string(),
                    },
                },
            }),
            ..GenerationConfig::default()
        }),
    )
}

pub fn summary_request(document: &LessonDocument) -> GenerateContentRequest {
    single_turn(
        vec![document.to_part(), Part::text(prompts::TEACHING_SUMMARY)],
        None,
    )
}

/// JSON-mode request for `[{topicTitle, teachingScript}]`.
pub fn deep_dive_request(document: &LessonDocument) -> GenerateContentRequest {
    single_turn(
        vec![document.to_part(), Part::text(prompts::DEEP_DIVE)],
        Some(GenerationConfig {
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(chapter_schema()),
            ..GenerationConfig::default()
        }),
    )
}

pub fn image_request(prompt: &str) -> GenerateContentRequest {
    single_turn(
        vec![Part::text(prompt)],
        Some(GenerationConfig {
            response_modalities: Some(vec!["IMAGE".to_string()]),
            image_config: Some(ImageConfig {
                aspect_ratio: "16:9".to_string(),
            }),
            ..GenerationConfig::default()
        }),
    )
}

fn chapter_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "topicTitle": { "type": "STRING" },
                "teachingScript": { "type": "STRING", "description": "Spoken coaching script." }
            },
            "required": ["topicTitle", "teachingScript"]
        }
    })
}
