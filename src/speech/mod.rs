//! Text-to-speech: backend seam, retry policy and the synthesis client.

pub mod backend;
pub mod retry;
pub mod synthesizer;

pub use backend::{MockReply, MockSpeechBackend, SpeechBackend};
pub use retry::{Backoff, RetryPolicy};
pub use synthesizer::{SpeechSynthesizer, SynthesizedAudio, clean_narration};
