use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::Value;

use super::error::PrefsError;

pub const MAX_KEY_LEN: usize = 128;

/// Keyed storage for preference blobs. Blobs are kept verbatim; callers
/// re-validate them on load.
pub trait PreferenceStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<Value>, PrefsError>;
    fn save(&self, key: &str, value: Value) -> Result<(), PrefsError>;
    /// Returns whether a blob was present.
    fn remove(&self, key: &str) -> Result<bool, PrefsError>;
}

pub fn validate_key(key: &str) -> Result<(), PrefsError> {
    if key.trim().is_empty() || key.len() > MAX_KEY_LEN || key.chars().any(char::is_control) {
        return Err(PrefsError::InvalidKey(key.to_string()));
    }
    Ok(())
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<Value>, PrefsError> {
        validate_key(key)?;
        let entries = self.entries.lock().map_err(|_| PrefsError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: Value) -> Result<(), PrefsError> {
        validate_key(key)?;
        let mut entries = self.entries.lock().map_err(|_| PrefsError::Poisoned)?;
        entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, PrefsError> {
        validate_key(key)?;
        let mut entries = self.entries.lock().map_err(|_| PrefsError::Poisoned)?;
        Ok(entries.remove(key).is_some())
    }
}

/// All blobs live in one JSON object on disk, rewritten atomically on change.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join("preferences.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, Value>, PrefsError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let file = File::open(&self.path).map_err(|e| {
            PrefsError::Io(format!("Failed to open {}: {}", self.path.display(), e))
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            PrefsError::Json(format!("Failed to parse {}: {}", self.path.display(), e))
        })
    }

    fn write_all(&self, entries: &BTreeMap<String, Value>) -> Result<(), PrefsError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    PrefsError::Io(format!(
                        "Failed to create directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let temp_path = self.path.with_extension("json.tmp");
        let file = File::create(&temp_path).map_err(|e| {
            PrefsError::Io(format!("Failed to create {}: {}", temp_path.display(), e))
        })?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, entries).map_err(|e| {
            PrefsError::Json(format!("Failed to serialize preferences: {}", e))
        })?;
        writer
            .flush()
            .and_then(|_| writer.get_ref().sync_all())
            .map_err(|e| {
                PrefsError::Io(format!("Failed to write {}: {}", temp_path.display(), e))
            })?;

        fs::rename(&temp_path, &self.path).map_err(|e| {
            PrefsError::Io(format!(
                "Failed to move {} into place: {}",
                temp_path.display(),
                e
            ))
        })
    }
}

impl PreferenceStore for JsonFileStore {
    fn load(&self, key: &str) -> Result<Option<Value>, PrefsError> {
        validate_key(key)?;
        let _guard = self.lock.lock().map_err(|_| PrefsError::Poisoned)?;
        Ok(self.read_all()?.remove(key))
    }

    fn save(&self, key: &str, value: Value) -> Result<(), PrefsError> {
        validate_key(key)?;
        let _guard = self.lock.lock().map_err(|_| PrefsError::Poisoned)?;
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value);
        self.write_all(&entries)
    }

    fn remove(&self, key: &str) -> Result<bool, PrefsError> {
        validate_key(key)?;
        let _guard = self.lock.lock().map_err(|_| PrefsError::Poisoned)?;
        let mut entries = self.read_all()?;
        let removed = entries.remove(key).is_some();
        if removed {
            self.write_all(&entries)?;
        }
        Ok(removed)
    }
}
