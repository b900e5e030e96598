//! End-to-end briefing flows: quick summary and deep dive.

use crate::audio::store::AudioStore;
use crate::audio::wav::WavFormat;
use crate::briefing::chapters::{self, Chapter};
use crate::briefing::planner::{self, PlannerOptions};
use crate::briefing::playlist::{DeepDive, Playlist, PlaylistAssembler};
use crate::config::Config;
use crate::defaults::{DEEP_DIVE_ID_PREFIX, SUMMARY_ID_PREFIX};
use crate::error::{LessonError, Result};
use crate::speech::backend::SpeechBackend;
use crate::speech::synthesizer::SpeechSynthesizer;
use std::sync::Arc;
use std::time::Duration;

/// Pacing and chunking knobs of the two flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BriefingSettings {
    pub summary_max_chunks: usize,
    pub planner: PlannerOptions,
    pub summary_delay: Duration,
    pub deep_dive_delay: Duration,
}

impl Default for BriefingSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for BriefingSettings {
    fn from(config: &Config) -> Self {
        Self {
            summary_max_chunks: config.playlist.summary_max_chunks,
            planner: PlannerOptions {
                min_chars: config.playlist.min_chunk_chars,
                label_max_chars: config.playlist.label_max_chars,
            },
            summary_delay: config.playlist.summary_delay(),
            deep_dive_delay: config.playlist.deep_dive_delay(),
        }
    }
}

/// Turns generated lesson text into narrated playlists.
pub struct BriefingPipeline {
    synthesizer: SpeechSynthesizer,
    settings: BriefingSettings,
}

impl BriefingPipeline {
    pub fn new(synthesizer: SpeechSynthesizer, settings: BriefingSettings) -> Self {
        Self {
            synthesizer,
            settings,
        }
    }

    /// Wire a pipeline from configuration.
    pub fn from_config(
        config: &Config,
        backend: Arc<dyn SpeechBackend>,
        store: Arc<dyn AudioStore>,
    ) -> Result<Self> {
        config.validate()?;
        let format = WavFormat {
            sample_rate: config.speech.sample_rate,
            ..WavFormat::SPEECH
        };
        let synthesizer = SpeechSynthesizer::new(backend, store)
            .with_retry_policy(config.speech.retry_policy())
            .with_format(format);
        Ok(Self::new(synthesizer, BriefingSettings::from(config)))
    }

    pub fn synthesizer(&self) -> &SpeechSynthesizer {
        &self.synthesizer
    }

    pub fn settings(&self) -> &BriefingSettings {
        &self.settings
    }

    /// Narrate the leading paragraphs of a teaching summary.
    ///
    /// Fails with [`LessonError::PlanningFailed`] only when the text has no
    /// narratable paragraph; individual synthesis failures shorten the
    /// playlist instead.
    pub async fn summary(&self, summary_text: &str) -> Result<Playlist> {
        let chunks = planner::plan_with(
            summary_text,
            self.settings.summary_max_chunks,
            self.settings.planner,
        );
        if chunks.is_empty() {
            return Err(LessonError::PlanningFailed {
                message: "Summary contains no narratable paragraphs".to_string(),
            });
        }

        Ok(PlaylistAssembler::new(&self.synthesizer)
            .build_playlist(&chunks, SUMMARY_ID_PREFIX, self.settings.summary_delay)
            .await)
    }

    /// Narrate the deep-dive breakdown returned by the generative service.
    pub async fn deep_dive(&self, chapters_json: &str) -> Result<DeepDive> {
        let chapters = chapters::parse_chapters(chapters_json)?;
        self.deep_dive_chapters(&chapters).await
    }

    /// Narrate already-parsed chapters.
    pub async fn deep_dive_chapters(&self, chapters: &[Chapter]) -> Result<DeepDive> {
        if chapters.is_empty() {
            return Err(LessonError::PlanningFailed {
                message: "Deep-dive breakdown contained no chapters".to_string(),
            });
        }

        Ok(PlaylistAssembler::new(&self.synthesizer)
            .build_deep_dive(chapters, DEEP_DIVE_ID_PREFIX, self.settings.deep_dive_delay)
            .await)
    }
}
