//! File-backed durable persistence tier.
//!
//! The file holds one JSON object of string values, the same shape the
//! browser keeps in `localStorage`. It is re-read on every access so two
//! invocations never work from stale copies.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use session::{KeyValueStore, StorageError};

pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Map<String, Value>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(err) => return Err(StorageError(format!("{}: {err}", self.path.display()))),
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => Ok(map),
            _ => {
                tracing::warn!(path = %self.path.display(), "state file is not a JSON object; ignoring it");
                Ok(Map::new())
            }
        }
    }

    fn persist(&self, map: &Map<String, Value>) -> Result<(), StorageError> {
        if map.is_empty() {
            return match fs::remove_file(&self.path) {
                Err(err) if err.kind() != ErrorKind::NotFound => {
                    Err(StorageError(format!("{}: {err}", self.path.display())))
                }
                _ => Ok(()),
            };
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| StorageError(format!("{}: {err}", parent.display())))?;
        }
        let rendered = serde_json::to_string_pretty(map).map_err(|err| StorageError(err.to_string()))?;
        fs::write(&self.path, rendered).map_err(|err| StorageError(format!("{}: {err}", self.path.display())))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.load() {
            Ok(map) => map.get(key).and_then(Value::as_str).map(str::to_owned),
            Err(err) => {
                tracing::warn!(error = %err, "state file unreadable");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut map = self.load()?;
        map.insert(key.to_owned(), Value::String(value.to_owned()));
        self.persist(&map)
    }

    fn remove(&self, key: &str) {
        let result = self.load().and_then(|mut map| {
            if map.remove(key).is_some() {
                self.persist(&map)
            } else {
                Ok(())
            }
        });
        if let Err(err) = result {
            tracing::warn!(error = %err, key, "failed to remove key from state file");
        }
    }
}
