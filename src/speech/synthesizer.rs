//! Speech synthesis client: text in, stored WAV container out.

use crate::audio::store::{AudioRef, AudioStore};
use crate::audio::wav::{self, WavFormat};
use crate::error::{LessonError, Result};
use crate::speech::backend::SpeechBackend;
use crate::speech::retry::RetryPolicy;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::sync::Arc;
use tracing::{debug, warn};

/// Markup characters that would be read aloud or produce silence.
const MARKUP_CHARS: [char; 2] = ['*', '#'];

/// A synthesized, stored audio container.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedAudio {
    pub audio: AudioRef,
    pub duration_secs: f64,
    /// Size of the stored container in bytes.
    pub container_len: usize,
}

/// Strip emphasis markup and surrounding whitespace from narration.
pub fn clean_narration(text: &str) -> String {
    text.replace(MARKUP_CHARS, "").trim().to_string()
}

/// Decode the base64 transport encoding of a PCM payload.
pub fn decode_transport(payload: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(payload.trim())
        .map_err(|e| LessonError::AudioDecode {
            message: e.to_string(),
        })
}

/// Client turning narration text into playable audio resources.
///
/// Every successful call allocates one resource in the store; releasing it
/// is the caller's job.
pub struct SpeechSynthesizer {
    backend: Arc<dyn SpeechBackend>,
    store: Arc<dyn AudioStore>,
    retry: RetryPolicy,
    format: WavFormat,
}

impl SpeechSynthesizer {
    pub fn new(backend: Arc<dyn SpeechBackend>, store: Arc<dyn AudioStore>) -> Self {
        Self {
            backend,
            store,
            retry: RetryPolicy::default(),
            format: WavFormat::SPEECH,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// PCM layout the backend returns.
    pub fn with_format(mut self, format: WavFormat) -> Self {
        self.format = format;
        self
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn store(&self) -> &Arc<dyn AudioStore> {
        &self.store
    }

    /// Synthesize `text` and store the resulting container.
    ///
    /// Returns `Ok(None)` without calling the backend when the cleaned text is
    /// empty. Rate-limit failures are retried per the policy; once the budget
    /// is spent they surface as [`LessonError::SynthesisFailed`]. Any other
    /// failure propagates immediately.
    pub async fn synthesize(&self, text: &str) -> Result<Option<SynthesizedAudio>> {
        let cleaned = clean_narration(text);
        if cleaned.is_empty() {
            debug!("Skipping synthesis of empty narration");
            return Ok(None);
        }

        let payload = self.request_with_retry(&cleaned).await?;
        let payload = match payload {
            Some(p) if !p.trim().is_empty() => p,
            _ => return Err(LessonError::NoAudioReturned),
        };

        let pcm = decode_transport(&payload)?;
        let container = wav::encode(&pcm, self.format)?;
        let container_len = container.len();
        let duration_secs = wav::duration_secs(pcm.len(), self.format);
        let audio = self.store.put(container)?;

        debug!(
            backend = self.backend.name(),
            %audio,
            duration_secs,
            "Synthesized narration"
        );

        Ok(Some(SynthesizedAudio {
            audio,
            duration_secs,
            container_len,
        }))
    }

    async fn request_with_retry(&self, text: &str) -> Result<Option<String>> {
        let mut retry = 0;
        loop {
            match self.backend.generate_speech(text).await {
                Ok(payload) => return Ok(payload),
                Err(e) if e.is_rate_limited() => {
                    retry += 1;
                    let Some(wait) = self.retry.delay_for(retry) else {
                        return Err(LessonError::SynthesisFailed {
                            message: format!(
                                "still rate limited after {} retries: {}",
                                self.retry.max_retries, e
                            ),
                        });
                    };
                    warn!(
                        backend = self.backend.name(),
                        retry,
                        wait_ms = wait.as_millis() as u64,
                        "Speech rate limit hit, retrying"
                    );
                    tokio::time::sleep(wait).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
