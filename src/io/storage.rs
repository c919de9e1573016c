use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::model::prefs::UiPrefs;
use crate::model::task::Task;

/// File name of the task forest slot
const TASKS_KEY: &str = "tasks.json";
/// File name of the UI preferences slot
const PREFS_KEY: &str = "prefs.json";

/// Error type for the persistence slot
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("could not encode JSON: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// The durable key-value slot: a data directory holding `tasks.json` and
/// `prefs.json`. Writes are atomic (temp file in the same directory, then
/// rename); reads of a missing key yield defaults rather than errors.
#[derive(Debug, Clone)]
pub struct Storage {
    dir: PathBuf,
}

impl Storage {
    /// Open the slot, creating the directory if needed.
    pub fn open(dir: &Path) -> Result<Storage, StorageError> {
        fs::create_dir_all(dir)?;
        Ok(Storage {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load the task forest. `Ok(None)` means the key is absent (first run);
    /// a read or parse failure is an error the caller records.
    pub fn load_tasks(&self) -> Result<Option<Vec<Task>>, StorageError> {
        let path = self.dir.join(TASKS_KEY);
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path).map_err(|e| StorageError::Read {
            path: path.clone(),
            source: e,
        })?;
        let tasks = serde_json::from_str(&text)
            .map_err(|e| StorageError::Parse { path, source: e })?;
        Ok(Some(tasks))
    }

    pub fn save_tasks(&self, tasks: &[Task]) -> Result<(), StorageError> {
        let data = serde_json::to_string_pretty(tasks)?;
        self.write_atomic(TASKS_KEY, data.as_bytes())
    }

    /// Load UI preferences, degrading to defaults on any failure.
    pub fn load_prefs(&self) -> UiPrefs {
        let path = self.dir.join(PREFS_KEY);
        fs::read_to_string(&path)
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok())
            .unwrap_or_default()
    }

    pub fn save_prefs(&self, prefs: &UiPrefs) -> Result<(), StorageError> {
        let data = serde_json::to_string_pretty(prefs)?;
        self.write_atomic(PREFS_KEY, data.as_bytes())
    }

    fn write_atomic(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(bytes)?;
        tmp.flush()?;
        tmp.persist(self.dir.join(key))
            .map_err(|e| StorageError::Io(e.error))?;
        Ok(())
    }
}

/// Resolve the data directory: explicit flag, then $CANOPY_DIR, then
/// ~/.canopy.
pub fn resolve_data_dir(flag: Option<&Path>) -> PathBuf {
    if let Some(dir) = flag {
        return dir.to_path_buf();
    }
    if let Ok(dir) = std::env::var("CANOPY_DIR") {
        return PathBuf::from(dir);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".canopy")
}
