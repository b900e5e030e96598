//! Error types for lessoncast.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LessonError {
    // Speech synthesis errors
    #[error("Rate limited by speech service: {message}")]
    RateLimited { message: String },

    #[error("Speech synthesis failed: {message}")]
    SynthesisFailed { message: String },

    #[error("Speech service returned no audio")]
    NoAudioReturned,

    #[error("Failed to decode audio payload: {message}")]
    AudioDecode { message: String },

    #[error("Invalid audio format: {message}")]
    InvalidAudioFormat { message: String },

    // Planning errors
    #[error("Briefing planning failed: {message}")]
    PlanningFailed { message: String },

    // Generative service errors
    #[error("Generative service returned no image")]
    NoImageReturned,

    #[error("Generative service error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // Configuration errors
    #[error("Failed to parse configuration: {message}")]
    ConfigParse { message: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl LessonError {
    /// True for the transient throttling signal the synthesizer retries on.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, LessonError::RateLimited { .. })
    }
}

pub type Result<T> = std::result::Result<T, LessonError>;
