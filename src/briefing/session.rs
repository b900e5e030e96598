//! Per-document ownership of generated briefings.
//!
//! Audio resources live as long as the playlist that references them: a new
//! playlist releases the one it replaces, and closing the session releases
//! everything.

use crate::audio::store::{AudioRef, AudioStore};
use crate::briefing::playlist::{DeepDive, Playlist};
use std::sync::Arc;
use tracing::warn;

/// Results generated for one uploaded lesson document.
pub struct LessonSession {
    store: Arc<dyn AudioStore>,
    summary_text: Option<String>,
    summary: Option<Playlist>,
    deep_dive: Option<DeepDive>,
    whiteboard: Option<String>,
}

impl LessonSession {
    pub fn new(store: Arc<dyn AudioStore>) -> Self {
        Self {
            store,
            summary_text: None,
            summary: None,
            deep_dive: None,
            whiteboard: None,
        }
    }

    pub fn summary_text(&self) -> Option<&str> {
        self.summary_text.as_deref()
    }

    pub fn summary(&self) -> Option<&Playlist> {
        self.summary.as_ref()
    }

    pub fn deep_dive(&self) -> Option<&DeepDive> {
        self.deep_dive.as_ref()
    }

    /// Whiteboard image as a data URL.
    pub fn whiteboard(&self) -> Option<&str> {
        self.whiteboard.as_deref()
    }

    pub fn set_summary_text(&mut self, text: impl Into<String>) {
        self.summary_text = Some(text.into());
    }

    /// Install a summary playlist, releasing the previous one.
    pub fn replace_summary(&mut self, playlist: Playlist) {
        if let Some(old) = self.summary.replace(playlist) {
            self.release_playlist(&old);
        }
    }

    /// Install a deep dive, releasing the previous one.
    pub fn replace_deep_dive(&mut self, deep_dive: DeepDive) {
        if let Some(old) = self.deep_dive.replace(deep_dive) {
            self.release_playlist(&old.playlist);
        }
    }

    pub fn set_whiteboard(&mut self, data_url: impl Into<String>) {
        self.whiteboard = Some(data_url.into());
    }

    /// Every audio resource currently held.
    pub fn audio_refs(&self) -> Vec<AudioRef> {
        self.summary
            .iter()
            .chain(self.deep_dive.iter().map(|d| &d.playlist))
            .flat_map(|p| p.audio_refs().cloned())
            .collect()
    }

    /// Drop all results and release their audio.
    pub fn clear(&mut self) {
        if let Some(old) = self.summary.take() {
            self.release_playlist(&old);
        }
        if let Some(old) = self.deep_dive.take() {
            self.release_playlist(&old.playlist);
        }
        self.summary_text = None;
        self.whiteboard = None;
    }

    /// End the session.
    pub fn close(mut self) {
        self.clear();
    }

    fn release_playlist(&self, playlist: &Playlist) {
        for audio in playlist.audio_refs() {
            if let Err(e) = self.store.release(audio) {
                warn!(%audio, error = %e, "Failed to release audio resource");
            }
        }
    }
}

impl Drop for LessonSession {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::store::MemoryAudioStore;
    use crate::briefing::playlist::AudioSection;

    fn playlist_in(store: &MemoryAudioStore, prefix: &str, n: usize) -> Playlist {
        let sections = (0..n)
            .map(|i| AudioSection {
                id: format!("{prefix}-{i}"),
                title: format!("Part {}", i + 1),
                audio_url: store.put(vec![0; 8]).unwrap(),
                duration: Some(1.0),
                chunk_index: i,
            })
            .collect();
        Playlist {
            sections,
            skipped: Vec::new(),
        }
    }

    #[test]
    fn replacing_summary_releases_old_audio() {
        let store = Arc::new(MemoryAudioStore::new());
        let mut session = LessonSession::new(store.clone());

        let first = playlist_in(&store, "summary", 3);
        let first_refs: Vec<_> = first.audio_refs().cloned().collect();
        session.replace_summary(first);
        assert_eq!(store.live_count(), 3);

        session.replace_summary(playlist_in(&store, "summary", 2));
        assert_eq!(store.live_count(), 2);
        assert!(first_refs.iter().all(|r| store.get(r).is_none()));
        assert_eq!(session.summary().unwrap().len(), 2);
    }

    #[test]
    fn replacing_deep_dive_releases_old_audio() {
        let store = Arc::new(MemoryAudioStore::new());
        let mut session = LessonSession::new(store.clone());

        session.replace_deep_dive(DeepDive {
            playlist: playlist_in(&store, "deepdive", 2),
            transcript: "## A\n\nB\n\n".to_string(),
        });
        session.replace_deep_dive(DeepDive {
            playlist: playlist_in(&store, "deepdive", 1),
            transcript: String::new(),
        });

        assert_eq!(store.live_count(), 1);
        assert_eq!(session.audio_refs().len(), 1);
    }

    #[test]
    fn closing_session_releases_everything() {
        let store = Arc::new(MemoryAudioStore::new());
        let mut session = LessonSession::new(store.clone());
        session.set_summary_text("summary");
        session.set_whiteboard("data:image/png;base64,AAAA");
        session.replace_summary(playlist_in(&store, "summary", 2));
        session.replace_deep_dive(DeepDive {
            playlist: playlist_in(&store, "deepdive", 2),
            transcript: String::new(),
        });
        assert_eq!(session.audio_refs().len(), 4);

        session.close();
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn dropping_session_releases_audio() {
        let store = Arc::new(MemoryAudioStore::new());
        {
            let mut session = LessonSession::new(store.clone());
            session.replace_summary(playlist_in(&store, "summary", 4));
        }
        assert_eq!(store.live_count(), 0);
    }
}
