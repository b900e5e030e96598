use crate::defaults;
use crate::error::{LessonError, Result};
use crate::speech::retry::{Backoff, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub speech: SpeechConfig,
    pub playlist: PlaylistConfig,
    pub api: ApiConfig,
}

/// Speech synthesis configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpeechConfig {
    pub model: String,
    pub voice: String,
    pub sample_rate: u32,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    pub backoff: Backoff,
}

/// Chunking and pacing configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlaylistConfig {
    pub summary_max_chunks: usize,
    pub min_chunk_chars: usize,
    pub label_max_chars: usize,
    pub summary_delay_ms: u64,
    pub deep_dive_delay_ms: u64,
}

/// Generative service configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub text_model: String,
    pub image_model: String,
    pub request_timeout_secs: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            model: defaults::DEFAULT_SPEECH_MODEL.to_string(),
            voice: defaults::DEFAULT_VOICE.to_string(),
            sample_rate: defaults::SAMPLE_RATE,
            max_retries: defaults::MAX_RETRIES,
            retry_base_delay_ms: defaults::RETRY_BASE_DELAY_MS,
            backoff: Backoff::Linear,
        }
    }
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        Self {
            summary_max_chunks: defaults::SUMMARY_MAX_CHUNKS,
            min_chunk_chars: defaults::MIN_CHUNK_CHARS,
            label_max_chars: defaults::LABEL_MAX_CHARS,
            summary_delay_ms: defaults::SUMMARY_DELAY_MS,
            deep_dive_delay_ms: defaults::DEEP_DIVE_DELAY_MS,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: defaults::DEFAULT_API_BASE_URL.to_string(),
            text_model: defaults::DEFAULT_TEXT_MODEL.to_string(),
            image_model: defaults::DEFAULT_IMAGE_MODEL.to_string(),
            request_timeout_secs: defaults::REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl SpeechConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
            backoff: self.backoff,
        }
    }
}

impl PlaylistConfig {
    pub fn summary_delay(&self) -> Duration {
        Duration::from_millis(self.summary_delay_ms)
    }

    pub fn deep_dive_delay(&self) -> Duration {
        Duration::from_millis(self.deep_dive_delay_ms)
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Ok(Self::default())
                } else {
                    Err(LessonError::ConfigParse {
                        message: format!("{}: {}", path.display(), e),
                    })
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - LESSONCAST_API_KEY → api.api_key
    /// - LESSONCAST_VOICE → speech.voice
    /// - LESSONCAST_SPEECH_MODEL → speech.model
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var("LESSONCAST_API_KEY")
            && !key.is_empty()
        {
            self.api.api_key = Some(key);
        }

        if let Ok(voice) = std::env::var("LESSONCAST_VOICE")
            && !voice.is_empty()
        {
            self.speech.voice = voice;
        }

        if let Ok(model) = std::env::var("LESSONCAST_SPEECH_MODEL")
            && !model.is_empty()
        {
            self.speech.model = model;
        }

        self
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.speech.sample_rate == 0 {
            return Err(LessonError::ConfigInvalidValue {
                key: "speech.sample_rate".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.speech.voice.trim().is_empty() {
            return Err(LessonError::ConfigInvalidValue {
                key: "speech.voice".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.playlist.summary_max_chunks == 0 {
            return Err(LessonError::ConfigInvalidValue {
                key: "playlist.summary_max_chunks".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.playlist.label_max_chars == 0 {
            return Err(LessonError::ConfigInvalidValue {
                key: "playlist.label_max_chars".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.api.request_timeout_secs == 0 {
            return Err(LessonError::ConfigInvalidValue {
                key: "api.request_timeout_secs".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/lessoncast/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("lessoncast")
            .join("config.toml")
    }
}
