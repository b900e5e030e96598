//! lessoncast - Narrated audio briefings from lesson documents
//!
//! Generated lesson text is split into chunks, each chunk is synthesized to
//! speech with rate-limit retries, and the results are wrapped as WAV and
//! assembled into an ordered playlist.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
pub mod briefing;
pub mod config;
pub mod defaults;
pub mod error;
pub mod genai;
pub mod speech;
pub mod whiteboard;

// Core traits (backend → synthesizer → store)
pub use audio::store::{AudioRef, AudioStore, DirAudioStore, MemoryAudioStore};
pub use speech::backend::SpeechBackend;
pub use whiteboard::ImageBackend;

// Pipeline
pub use briefing::{
    AudioSection, BriefingPipeline, BriefingSettings, Chapter, DeepDive, LessonSession, Playlist,
    PlaylistAssembler, TextChunk,
};
pub use speech::{RetryPolicy, SpeechSynthesizer};

// Error handling
pub use error::{LessonError, Result};

// Config
pub use config::Config;

#[cfg(feature = "gemini")]
pub use genai::GeminiClient;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_starts_with_cargo_version() {
        let ver = version_string();
        assert!(
            ver.starts_with(env!("CARGO_PKG_VERSION")),
            "version_string should start with CARGO_PKG_VERSION, got: {}",
            ver
        );
    }

    #[test]
    fn version_string_contains_plus_when_git_hash_present() {
        let ver = version_string();
        if option_env!("GIT_HASH").is_some_and(|h| !h.is_empty()) {
            assert!(ver.contains('+'), "expected '+' in {}", ver);
        } else {
            assert_eq!(ver, env!("CARGO_PKG_VERSION"));
        }
    }
}
