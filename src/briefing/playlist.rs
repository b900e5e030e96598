//! Sequential playlist assembly.
//!
//! Chunks are synthesized one at a time in narration order with a fixed pause
//! between calls. A chunk that fails is dropped and assembly continues, so
//! the playlist order always matches chunk order without a sort step.

use crate::audio::store::AudioRef;
use crate::briefing::chapters::{self, Chapter};
use crate::briefing::planner::TextChunk;
use crate::speech::synthesizer::SpeechSynthesizer;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// One playable track of a playlist.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioSection {
    /// `"{prefix}-{chunk_index}"`, stable across re-renders.
    pub id: String,
    pub title: String,
    pub audio_url: AudioRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Index of the originating chunk.
    pub chunk_index: usize,
}

/// Ordered narration tracks for one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Playlist {
    pub sections: Vec<AudioSection>,
    /// Chunk indices that produced no section, ascending.
    pub skipped: Vec<usize>,
}

impl Playlist {
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AudioSection> {
        self.sections.iter()
    }

    /// Look up a section by id.
    pub fn get(&self, id: &str) -> Option<&AudioSection> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// Position of the section following `id`, for auto-advance.
    pub fn next_after(&self, id: &str) -> Option<&AudioSection> {
        let pos = self.sections.iter().position(|s| s.id == id)?;
        self.sections.get(pos + 1)
    }

    /// Every audio resource the playlist references.
    pub fn audio_refs(&self) -> impl Iterator<Item = &AudioRef> {
        self.sections.iter().map(|s| &s.audio_url)
    }

    /// Sum of known section durations, in seconds.
    pub fn total_duration(&self) -> f64 {
        self.sections.iter().filter_map(|s| s.duration).sum()
    }
}

impl<'a> IntoIterator for &'a Playlist {
    type Item = &'a AudioSection;
    type IntoIter = std::slice::Iter<'a, AudioSection>;

    fn into_iter(self) -> Self::IntoIter {
        self.sections.iter()
    }
}

/// Deep-dive result: audio chapters plus the full written guide.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeepDive {
    pub playlist: Playlist,
    pub transcript: String,
}

/// Drives the synthesizer over a chunk list.
pub struct PlaylistAssembler<'a> {
    synthesizer: &'a SpeechSynthesizer,
}

impl<'a> PlaylistAssembler<'a> {
    pub fn new(synthesizer: &'a SpeechSynthesizer) -> Self {
        Self { synthesizer }
    }

    /// Synthesize `chunks` in order, pausing `inter_chunk_delay` before every
    /// chunk but the first.
    ///
    /// Never fails: chunks whose synthesis errors are logged and left out.
    pub async fn build_playlist(
        &self,
        chunks: &[TextChunk],
        id_prefix: &str,
        inter_chunk_delay: Duration,
    ) -> Playlist {
        let mut playlist = Playlist::default();

        for (position, chunk) in chunks.iter().enumerate() {
            if position > 0 && !inter_chunk_delay.is_zero() {
                tokio::time::sleep(inter_chunk_delay).await;
            }

            match self.synthesizer.synthesize(&chunk.text).await {
                Ok(Some(audio)) => {
                    let id = format!("{}-{}", id_prefix, chunk.index);
                    debug!(%id, title = %chunk.label, "Section ready");
                    playlist.sections.push(AudioSection {
                        id,
                        title: chunk.label.clone(),
                        audio_url: audio.audio,
                        duration: Some(audio.duration_secs),
                        chunk_index: chunk.index,
                    });
                }
                Ok(None) => {
                    debug!(chunk = chunk.index, "Chunk has no narratable text, skipping");
                    playlist.skipped.push(chunk.index);
                }
                Err(e) => {
                    warn!(chunk = chunk.index, prefix = id_prefix, error = %e, "Skipping chunk");
                    playlist.skipped.push(chunk.index);
                }
            }
        }

        info!(
            prefix = id_prefix,
            sections = playlist.len(),
            skipped = playlist.skipped.len(),
            "Playlist assembled"
        );
        playlist
    }

    /// Narrate deep-dive chapters and build the companion transcript.
    ///
    /// The transcript covers every chapter, including ones whose audio failed.
    pub async fn build_deep_dive(
        &self,
        chapters: &[Chapter],
        id_prefix: &str,
        inter_chunk_delay: Duration,
    ) -> DeepDive {
        let chunks = chapters::chapters_to_chunks(chapters);
        let playlist = self
            .build_playlist(&chunks, id_prefix, inter_chunk_delay)
            .await;
        DeepDive {
            playlist,
            transcript: chapters::transcript(chapters),
        }
    }
}
