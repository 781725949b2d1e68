//! Key-value persistence for the high score and unlocked pieces
//! (XDG data dir or ~/.local/share/blocktui).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const HIGH_SCORE_KEY: &str = "highScore";
pub const UNLOCKS_KEY: &str = "unlockedPieceIds";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed value for {key}: {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Opaque string storage. Missing keys load as `None`.
pub trait KeyValueStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Returns the default data directory (data dir / blocktui).
pub fn default_data_dir() -> PathBuf {
    let base = match std::env::var("XDG_DATA_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => std::env::var("HOME")
            .map(|h| PathBuf::from(h).join(".local").join("share"))
            .unwrap_or_else(|_| PathBuf::from(".")),
    };
    base.join("blocktui")
}

/// One file per key inside `dir`. The directory is created on first save.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl KeyValueStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|source| StorageError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.path_for(key);
        fs::write(&path, value).map_err(|source| StorageError::Io { path, source })
    }
}

/// In-memory store; nothing outlives the process.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: std::collections::HashMap<String, String>,
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// High score; 0 on missing or unparsable value.
pub fn load_high_score(store: &dyn KeyValueStore) -> Result<u32, StorageError> {
    Ok(store
        .load(HIGH_SCORE_KEY)?
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0))
}

pub fn save_high_score(store: &mut dyn KeyValueStore, score: u32) -> Result<(), StorageError> {
    store.save(HIGH_SCORE_KEY, &score.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let mut s = MemoryStore::default();
        assert_eq!(s.load("k").unwrap(), None);
        s.save("k", "v").unwrap();
        assert_eq!(s.load("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_high_score_defaults_to_zero() {
        let mut s = MemoryStore::default();
        assert_eq!(load_high_score(&s).unwrap(), 0);
        s.save(HIGH_SCORE_KEY, "not a number").unwrap();
        assert_eq!(load_high_score(&s).unwrap(), 0);
        save_high_score(&mut s, 4200).unwrap();
        assert_eq!(load_high_score(&s).unwrap(), 4200);
    }

    #[test]
    fn test_file_store_creates_dir() {
        let dir = std::env::temp_dir().join(format!("blocktui-test-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        let mut s = FileStore::new(dir.join("nested"));
        assert_eq!(s.load(HIGH_SCORE_KEY).unwrap(), None);
        save_high_score(&mut s, 77).unwrap();
        assert_eq!(load_high_score(&s).unwrap(), 77);
        assert!(s.dir().join(HIGH_SCORE_KEY).is_file());
        let _ = fs::remove_dir_all(&dir);
    }
}
