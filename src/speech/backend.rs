use crate::error::{LessonError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Trait for the external text-to-speech capability.
///
/// This trait allows swapping implementations (real service vs mock).
#[async_trait::async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Request speech for already-cleaned narration text.
    ///
    /// # Returns
    /// Base64-encoded 16-bit PCM at 24kHz mono, `None` when the service
    /// answered without an audio payload, or an error. Throttling must be
    /// reported as [`LessonError::RateLimited`].
    async fn generate_speech(&self, text: &str) -> Result<Option<String>>;

    /// Name of the backing model or service.
    fn name(&self) -> &str;
}

/// Implement SpeechBackend for Arc<T> to allow sharing across pipelines.
#[async_trait::async_trait]
impl<T: SpeechBackend> SpeechBackend for Arc<T> {
    async fn generate_speech(&self, text: &str) -> Result<Option<String>> {
        (**self).generate_speech(text).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// One scripted reply of [`MockSpeechBackend`].
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Succeed with these PCM bytes.
    Audio(Vec<u8>),
    RateLimited,
    Fail(String),
    /// Succeed without a payload.
    Empty,
}

/// Mock speech backend for testing.
///
/// Scripted replies are consumed in order; once exhausted every call
/// succeeds with the default PCM. Texts containing a registered needle
/// always fail.
#[derive(Debug)]
pub struct MockSpeechBackend {
    name: String,
    default_pcm: Vec<u8>,
    script: Mutex<VecDeque<MockReply>>,
    failing_needles: Vec<String>,
    calls: Mutex<Vec<String>>,
}

impl MockSpeechBackend {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            default_pcm: vec![0u8; 480],
            script: Mutex::new(VecDeque::new()),
            failing_needles: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// PCM returned by unscripted successful calls.
    pub fn with_default_pcm(mut self, pcm: Vec<u8>) -> Self {
        self.default_pcm = pcm;
        self
    }

    /// Queue replies for the next calls.
    pub fn with_script(self, replies: impl IntoIterator<Item = MockReply>) -> Self {
        self.lock_script().extend(replies);
        self
    }

    /// Fail (non-retryably) every call whose text contains `needle`.
    pub fn with_failure_for(mut self, needle: &str) -> Self {
        self.failing_needles.push(needle.to_string());
        self
    }

    /// Texts received so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls().len()
    }

    fn lock_script(&self) -> std::sync::MutexGuard<'_, VecDeque<MockReply>> {
        self.script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait::async_trait]
impl SpeechBackend for MockSpeechBackend {
    async fn generate_speech(&self, text: &str) -> Result<Option<String>> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(text.to_string());

        if self.failing_needles.iter().any(|n| text.contains(n)) {
            return Err(LessonError::SynthesisFailed {
                message: "mock synthesis failure".to_string(),
            });
        }

        let reply = self
            .lock_script()
            .pop_front()
            .unwrap_or_else(|| MockReply::Audio(self.default_pcm.clone()));

        match reply {
            MockReply::Audio(pcm) => Ok(Some(STANDARD.encode(pcm))),
            MockReply::RateLimited => Err(LessonError::RateLimited {
                message: "429 Too Many Requests".to_string(),
            }),
            MockReply::Fail(message) => Err(LessonError::SynthesisFailed { message }),
            MockReply::Empty => Ok(None),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
