//! Generative-AI service integration.

#[cfg(feature = "gemini")]
pub mod gemini;
pub mod prompts;
pub mod types;

#[cfg(feature = "gemini")]
pub use gemini::GeminiClient;
pub use types::{LessonDocument, classify_error};
