use serde::{de::DeserializeOwned, Serialize};
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::StoreError;

pub const SETTINGS_KEY: &str = "pomodoro_settings";
pub const TASKS_KEY: &str = "pomodoro_tasks";
pub const SESSIONS_KEY: &str = "pomodoro_sessions";
pub const TIMER_STATE_KEY: &str = "timer_state";

const APP_DIR: &str = "mintimer";

/// Key-addressed JSON documents under one data directory.
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StoreError::CreateDir {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    /// Load the document stored under `key`. Absent or malformed documents
    /// yield `T::default()`.
    pub fn load<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let path = self.path_for(key);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(key, "no stored document, using defaults");
                return T::default();
            }
            Err(e) => {
                warn!(key, error = %e, "failed to read stored document, using defaults");
                return T::default();
            }
        };

        match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "malformed stored document, using defaults");
                T::default()
            }
        }
    }

    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(value).map_err(|source| StoreError::Serialize {
            key: key.to_string(),
            source,
        })?;
        let path = self.path_for(key);
        atomic_write(&path, json.as_bytes()).map_err(|source| StoreError::Write { path, source })
    }

    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Remove { path, source }),
        }
    }
}

/// Write `content` to `path` through a temp file in the same directory.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Per-platform default data directory.
pub fn default_data_dir() -> PathBuf {
    if cfg!(target_os = "macos") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join("Library/Application Support").join(APP_DIR)
    } else if cfg!(target_os = "windows") {
        let appdata = std::env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(appdata).join(APP_DIR)
    } else {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".local/share").join(APP_DIR)
    }
}
