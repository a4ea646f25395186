//! Persistence of the recorded sequence
//!
//! The sequence is stored as a JSON array of `{x, y}` under a single key so
//! it survives page reloads. Reads never fail: an absent or malformed entry
//! loads as an empty sequence.

use crate::recorder::error::RecorderResult;
use crate::recorder::sequence::RecordingSequence;
use parking_lot::Mutex as ParkingMutex;
use std::collections::HashMap;
#[cfg(not(target_arch = "wasm32"))]
use std::path::{Path, PathBuf};

/// Key the snapshot is stored under
pub const DEFAULT_STORAGE_KEY: &str = "autoClickRecording";

/// Durable string key-value storage
pub trait KeyValueStore {
    fn get(&self, key: &str) -> RecorderResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> RecorderResult<()>;
    fn remove(&self, key: &str) -> RecorderResult<()>;
}

impl<K: KeyValueStore + ?Sized> KeyValueStore for Box<K> {
    fn get(&self, key: &str) -> RecorderResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> RecorderResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> RecorderResult<()> {
        (**self).remove(key)
    }
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: ParkingMutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> RecorderResult<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> RecorderResult<()> {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> RecorderResult<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per entry inside a directory
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    write_lock: ParkingMutex<()>,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: ParkingMutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<key>.json`, with every byte outside `[A-Za-z0-9-]` written as `_xx`
    fn entry_path(&self, key: &str) -> PathBuf {
        let mut name = String::with_capacity(key.len());
        for byte in key.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' {
                name.push(byte as char);
            } else {
                name.push_str(&format!("_{:02x}", byte));
            }
        }
        self.dir.join(format!("{}.json", name))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> RecorderResult<Option<String>> {
        match std::fs::read_to_string(self.entry_path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> RecorderResult<()> {
        let _guard = self.write_lock.lock();
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.entry_path(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> RecorderResult<()> {
        let _guard = self.write_lock.lock();
        match std::fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Saves, loads and clears the recording snapshot
#[derive(Debug)]
pub struct PersistenceStore<K> {
    backend: K,
    key: String,
}

impl<K: KeyValueStore> PersistenceStore<K> {
    pub fn new(backend: K) -> Self {
        Self::with_key(backend, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(backend: K, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn backend(&self) -> &K {
        &self.backend
    }

    pub fn save(&self, sequence: &RecordingSequence) -> RecorderResult<()> {
        let json = serde_json::to_string(sequence)?;
        self.backend.set(&self.key, &json)?;
        tracing::info!("Saved {} points under '{}'", sequence.len(), self.key);
        Ok(())
    }

    pub fn load(&self) -> RecordingSequence {
        let raw = match self.backend.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return RecordingSequence::new(),
            Err(e) => {
                tracing::warn!("Failed to read '{}': {}", self.key, e);
                return RecordingSequence::new();
            }
        };

        match serde_json::from_str::<RecordingSequence>(&raw) {
            Ok(sequence) => {
                tracing::info!("Loaded {} points from '{}'", sequence.len(), self.key);
                sequence
            }
            Err(e) => {
                tracing::warn!("Ignoring malformed snapshot under '{}': {}", self.key, e);
                RecordingSequence::new()
            }
        }
    }

    pub fn clear(&self) -> RecorderResult<()> {
        self.backend.remove(&self.key)?;
        tracing::info!("Cleared '{}'", self.key);
        Ok(())
    }
}
