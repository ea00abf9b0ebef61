//! Persistence gateway.
//!
//! The tracker only produces and consumes payload strings; a [`Gateway`]
//! moves them in and out of a durable slot.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use crate::error::StorageError;

use super::{data_dir, schema::STORAGE_KEY};

/// A single durable key-value slot.
pub trait Gateway {
    /// Read the slot. `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<String>, StorageError>;

    /// Overwrite the slot.
    fn save(&self, payload: &str) -> Result<(), StorageError>;
}

/// Slot backed by one JSON file.
#[derive(Debug, Clone)]
pub struct FileGateway {
    path: PathBuf,
}

impl FileGateway {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data dir>/<file_name>`, creating the directory if needed.
    pub fn in_data_dir(file_name: &str) -> Result<Self, StorageError> {
        Ok(Self::new(data_dir()?.join(file_name)))
    }

    /// Default slot file name.
    pub fn default_file_name() -> String {
        format!("{STORAGE_KEY}.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Gateway for FileGateway {
    fn load(&self) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::ReadFailed {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Write to a sibling temp file, then rename over the slot so a crash
    /// never leaves a half-written payload behind.
    fn save(&self, payload: &str) -> Result<(), StorageError> {
        let write_failed = |source| StorageError::WriteFailed {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(write_failed)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, payload).map_err(write_failed)?;
        std::fs::rename(&tmp, &self.path).map_err(write_failed)?;
        Ok(())
    }
}

/// In-process slot, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    slot: RefCell<Option<String>>,
    writes: RefCell<usize>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_payload(payload: impl Into<String>) -> Self {
        Self {
            slot: RefCell::new(Some(payload.into())),
            writes: RefCell::new(0),
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.slot.borrow().clone()
    }

    /// Number of `save` calls so far.
    pub fn write_count(&self) -> usize {
        *self.writes.borrow()
    }
}

impl Gateway for MemoryGateway {
    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.slot.borrow().clone())
    }

    fn save(&self, payload: &str) -> Result<(), StorageError> {
        *self.slot.borrow_mut() = Some(payload.to_string());
        *self.writes.borrow_mut() += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_gateway_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = FileGateway::new(dir.path().join("absent.json"));
        assert_eq!(gateway.load().unwrap(), None);
    }

    #[test]
    fn file_gateway_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = FileGateway::new(dir.path().join("nested").join("slot.json"));
        gateway.save(r#"{"subjects":[]}"#).unwrap();
        assert_eq!(gateway.load().unwrap().as_deref(), Some(r#"{"subjects":[]}"#));
        assert!(!gateway.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn memory_gateway_counts_writes() {
        let gateway = MemoryGateway::with_payload("{}");
        assert_eq!(gateway.load().unwrap().as_deref(), Some("{}"));
        gateway.save("a").unwrap();
        gateway.save("b").unwrap();
        assert_eq!(gateway.contents().as_deref(), Some("b"));
        assert_eq!(gateway.write_count(), 2);
    }

    #[test]
    fn default_file_name_uses_storage_key() {
        assert_eq!(FileGateway::default_file_name(), "smartLearningTracker.json");
    }
}
