// 💾 Blob Persistence - where the category store lives between runs
// The store is read whole and written whole; backends only move bytes.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};

/// Load/save of a single opaque blob.
///
/// `load` returns `Ok(None)` when nothing has been persisted yet.
pub trait StoreBackend: Send + Sync {
    fn load(&self) -> Result<Option<String>>;

    fn save(&self, blob: &str) -> Result<()>;

    /// Where the blob lives, for log messages
    fn describe(&self) -> String;
}

// ============================================================================
// FILE BACKEND
// ============================================================================

/// Blob stored in a single file at a fixed path.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileBackend { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: std::io::Error) -> Error {
        Error::StoreIo {
            path: self.path.clone(),
            source,
        }
    }
}

impl StoreBackend for FileBackend {
    fn load(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn save(&self, blob: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        // Write-then-rename: a crash mid-write leaves the previous file intact
        let temp = self.temp_path();
        fs::write(&temp, blob).map_err(|e| self.io_error(e))?;
        fs::rename(&temp, &self.path).map_err(|e| self.io_error(e))?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

// ============================================================================
// MEMORY BACKEND
// ============================================================================

/// In-process blob; clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    blob: Arc<Mutex<Option<String>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(blob: impl Into<String>) -> Self {
        MemoryBackend {
            blob: Arc::new(Mutex::new(Some(blob.into()))),
        }
    }

    /// Current persisted content
    pub fn contents(&self) -> Option<String> {
        self.slot().clone()
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        // A poisoned slot still holds the last complete write
        self.blob.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl StoreBackend for MemoryBackend {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.slot().clone())
    }

    fn save(&self, blob: &str) -> Result<()> {
        *self.slot() = Some(blob.to_string());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_backend_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("categories.json"));
        assert_eq!(backend.load().unwrap(), None);
    }

    #[test]
    fn test_file_backend_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("categories.json");
        let backend = FileBackend::new(&path);

        backend.save("{\"a\":[]}").unwrap();
        backend.save("{\"b\":[]}").unwrap();

        assert_eq!(backend.load().unwrap().as_deref(), Some("{\"b\":[]}"));
        assert!(!backend.temp_path().exists(), "temp file should be renamed away");
    }

    #[test]
    fn test_memory_backend_clones_share_state() {
        let backend = MemoryBackend::new();
        let other = backend.clone();

        assert_eq!(backend.load().unwrap(), None);
        other.save("{}").unwrap();
        assert_eq!(backend.contents().as_deref(), Some("{}"));
    }
}
