//! Default configuration constants for lessoncast.
//!
//! Shared by the config types and the pipeline so both agree on the
//! audio format and pacing contract.

/// Sample rate of the PCM returned by the speech service, in Hz.
pub const SAMPLE_RATE: u32 = 24000;

/// The speech service returns mono audio.
pub const CHANNELS: u16 = 1;

/// Bit depth of each PCM sample.
pub const BITS_PER_SAMPLE: u16 = 16;

/// Size of the WAV header written in front of every PCM payload.
pub const WAV_HEADER_LEN: usize = 44;

/// Maximum number of paragraphs narrated in a quick summary.
pub const SUMMARY_MAX_CHUNKS: usize = 8;

/// Paragraphs with this many characters or fewer are formatting noise.
pub const MIN_CHUNK_CHARS: usize = 20;

/// Maximum characters of a derived chunk label, before the ellipsis.
pub const LABEL_MAX_CHARS: usize = 30;

/// Pause before each quick-summary chunk after the first.
pub const SUMMARY_DELAY_MS: u64 = 1000;

/// Pause before each deep-dive chapter after the first.
pub const DEEP_DIVE_DELAY_MS: u64 = 1500;

/// Retries granted to a single synthesis call on rate limiting.
pub const MAX_RETRIES: u32 = 3;

/// Base wait before the first rate-limit retry.
pub const RETRY_BASE_DELAY_MS: u64 = 2000;

/// Id prefix for quick-summary sections.
pub const SUMMARY_ID_PREFIX: &str = "summary";

/// Id prefix for deep-dive sections.
pub const DEEP_DIVE_ID_PREFIX: &str = "deepdive";

/// Prebuilt voice used for narration.
pub const DEFAULT_VOICE: &str = "Kore";

/// Speech generation model.
pub const DEFAULT_SPEECH_MODEL: &str = "gemini-2.5-flash-preview-tts";

/// Model used for summaries and deep-dive chapters.
pub const DEFAULT_TEXT_MODEL: &str = "gemini-3-flash-preview";

/// Model used for whiteboard images.
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

/// Root of the generative-language REST API.
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Per-request timeout for generative service calls, in seconds.
///
/// Speech for a long paragraph can take tens of seconds to generate.
pub const REQUEST_TIMEOUT_SECS: u64 = 90;

/// Characters of summary context included in a whiteboard prompt.
pub const WHITEBOARD_CONTEXT_CHARS: usize = 500;
