//! Addressable storage for synthesized audio containers.
//!
//! The synthesizer allocates one resource per section; whoever owns the
//! playlist releases it when the playlist is superseded or the session ends.

use crate::error::{LessonError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

const MEMORY_SCHEME: &str = "blob:lessoncast/";
const FILE_SCHEME: &str = "file://";

/// Reference to a playable audio resource, in URL form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AudioRef(String);

impl AudioRef {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AudioRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trait for holding container blobs behind an [`AudioRef`].
pub trait AudioStore: Send + Sync {
    /// Store a container and return a reference a player can open.
    fn put(&self, container: Vec<u8>) -> Result<AudioRef>;

    /// Free the resource behind `audio`. Unknown references are ignored.
    fn release(&self, audio: &AudioRef) -> Result<()>;
}

impl<T: AudioStore> AudioStore for Arc<T> {
    fn put(&self, container: Vec<u8>) -> Result<AudioRef> {
        (**self).put(container)
    }

    fn release(&self, audio: &AudioRef) -> Result<()> {
        (**self).release(audio)
    }
}

/// In-process store handing out `blob:` references.
#[derive(Debug, Default)]
pub struct MemoryAudioStore {
    next_id: AtomicU64,
    blobs: Mutex<HashMap<AudioRef, Arc<[u8]>>>,
}

impl MemoryAudioStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes behind a live reference.
    pub fn get(&self, audio: &AudioRef) -> Option<Arc<[u8]>> {
        self.lock().get(audio).cloned()
    }

    /// Number of resources not yet released.
    pub fn live_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<AudioRef, Arc<[u8]>>> {
        self.blobs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl AudioStore for MemoryAudioStore {
    fn put(&self, container: Vec<u8>) -> Result<AudioRef> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let audio = AudioRef::new(format!("{MEMORY_SCHEME}{id}"));
        self.lock().insert(audio.clone(), Arc::from(container));
        Ok(audio)
    }

    fn release(&self, audio: &AudioRef) -> Result<()> {
        self.lock().remove(audio);
        Ok(())
    }
}

/// Store writing each container to a `.wav` file in a directory.
///
/// Only files this store wrote are ever removed.
#[derive(Debug)]
pub struct DirAudioStore {
    dir: PathBuf,
    next_id: AtomicU64,
    issued: Mutex<HashSet<PathBuf>>,
}

impl DirAudioStore {
    /// Create the store, creating `dir` if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            next_id: AtomicU64::new(0),
            issued: Mutex::new(HashSet::new()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Filesystem path behind a live reference issued by this store.
    pub fn path_of(&self, audio: &AudioRef) -> Option<PathBuf> {
        let path = PathBuf::from(audio.as_str().strip_prefix(FILE_SCHEME)?);
        self.issued_paths().contains(&path).then_some(path)
    }

    fn issued_paths(&self) -> std::sync::MutexGuard<'_, HashSet<PathBuf>> {
        self.issued.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl AudioStore for DirAudioStore {
    fn put(&self, container: Vec<u8>) -> Result<AudioRef> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let path = self.dir.join(format!("section-{id:04}.wav"));
        fs::write(&path, container)?;
        let audio = AudioRef::new(format!("{FILE_SCHEME}{}", path.display()));
        self.issued_paths().insert(path);
        Ok(audio)
    }

    fn release(&self, audio: &AudioRef) -> Result<()> {
        let Some(path) = audio.as_str().strip_prefix(FILE_SCHEME).map(PathBuf::from) else {
            return Ok(());
        };
        if !self.issued_paths().remove(&path) {
            return Ok(());
        }
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                self.issued_paths().insert(path);
                Err(LessonError::Io(e))
            }
        }
    }
}
