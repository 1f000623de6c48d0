use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use tempfile::NamedTempFile;

/// Read/write failure against a storage backend. Callers log and degrade;
/// a storage failure is never allowed to crash the store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Where serialized state lives. `load` returns `Ok(None)` when nothing has
/// been persisted yet.
pub trait StorageBackend: Send + Sync {
    fn load(&self) -> Result<Option<String>, StorageError>;
    fn save(&self, payload: &str) -> Result<(), StorageError>;
}

/// JSON document on disk. Writes go through a temp file in the same
/// directory and replace the destination atomically, so a crash mid-write
/// never leaves a truncated document.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> FileStorage {
        FileStorage { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl StorageBackend for FileStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(payload) => Ok(Some(payload)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn save(&self, payload: &str) -> Result<(), StorageError> {
        let write_err = |source: std::io::Error| StorageError::Write {
            path: self.path.clone(),
            source,
        };
        let dir = self.path.parent().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
        let mut tmp = NamedTempFile::new_in(&dir).map_err(write_err)?;
        tmp.write_all(payload.as_bytes()).map_err(write_err)?;
        tmp.persist(&self.path)
            .map_err(|e| write_err(e.error))
            .map(|_| ())
    }
}

/// In-memory backend for tests and import/export tooling.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    data: Mutex<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> MemoryStorage {
        MemoryStorage::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.data.lock().map(|d| d.clone()).unwrap_or(None))
    }

    fn save(&self, payload: &str) -> Result<(), StorageError> {
        if let Ok(mut data) = self.data.lock() {
            *data = Some(payload.to_string());
        }
        Ok(())
    }
}
