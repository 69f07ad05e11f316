//! Settings stores
//!
//! - [`MemoryStore`]: process-local map, used by tests and headless runs
//! - [`JsonFileStore`]: flat JSON object on disk, rewritten atomically
//! - [`NullStore`]: storage that is never available

use super::SettingsStore;
use crate::{MusicError, Result};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// In-memory settings store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with values
    pub fn with_values<K, V>(values: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Settings persisted as a JSON object of strings.
///
/// The file is read once on open. Each write rewrites the whole document
/// through a temporary file in the same directory, then renames it over the
/// target.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open (or lazily create) a settings file.
    ///
    /// A missing file starts empty; an unreadable or malformed one is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, values })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<()> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        serde_json::to_writer_pretty(tmp.as_file_mut(), &self.values)?;
        tmp.as_file_mut().flush()?;
        tmp.persist(&self.path)
            .map_err(|e| MusicError::Storage(format!("Failed to persist settings: {}", e)))?;
        Ok(())
    }
}

impl SettingsStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let previous = self.values.insert(key.to_string(), value.to_string());
        if let Err(err) = self.persist() {
            match previous {
                Some(old) => self.values.insert(key.to_string(), old),
                None => self.values.remove(key),
            };
            return Err(err);
        }
        Ok(())
    }
}

/// Storage that is never available; every call fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStore;

impl SettingsStore for NullStore {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(MusicError::Storage("settings storage unavailable".into()))
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
        Err(MusicError::Storage("settings storage unavailable".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::with_values([("musicMuted", "1")]);
        assert_eq!(store.get("musicMuted").unwrap().as_deref(), Some("1"));
        assert_eq!(store.get("musicVolume").unwrap(), None);
        store.set("musicVolume", "0.5").unwrap();
        assert_eq!(store.get("musicVolume").unwrap().as_deref(), Some("0.5"));
    }

    #[test]
    fn test_json_file_store_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get("musicVolume").unwrap(), None);
        store.set("musicVolume", "0.25").unwrap();
        store.set("musicMuted", "0").unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get("musicVolume").unwrap().as_deref(), Some("0.25"));
        assert_eq!(reopened.get("musicMuted").unwrap().as_deref(), Some("0"));
    }

    #[test]
    fn test_json_file_store_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "[1, 2").unwrap();
        assert!(JsonFileStore::open(&path).is_err());
    }

    #[test]
    fn test_json_file_store_write_failure_keeps_old_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("settings.json");
        let mut store = JsonFileStore::open(&path).unwrap();
        assert!(store.set("musicVolume", "0.5").is_err());
        assert_eq!(store.get("musicVolume").unwrap(), None);
    }

    #[test]
    fn test_null_store_always_fails() {
        let mut store = NullStore;
        assert!(store.get("musicMuted").is_err());
        assert!(store.set("musicMuted", "1").is_err());
    }
}
