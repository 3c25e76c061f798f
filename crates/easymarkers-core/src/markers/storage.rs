//! Byte-level access to marker sidecars
//!
//! The marker store never touches the filesystem directly; it reads and
//! writes sidecar text through a [`SidecarStorage`] backend. The default
//! backend is the local filesystem. [`MemoryStorage`] keeps documents in a
//! shared map and is handy for tests and for hosts that keep markers
//! elsewhere.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Backend that reads and writes raw sidecar bytes
pub trait SidecarStorage: Send {
    /// Read the sidecar at `path`; `Ok(None)` when it does not exist yet
    fn read(&self, path: &Path) -> io::Result<Option<Vec<u8>>>;

    /// Replace the sidecar at `path` with `contents`
    fn write(&mut self, path: &Path, contents: &[u8]) -> io::Result<()>;
}

/// Sidecars stored as files next to the audio
#[derive(Debug, Clone, Copy, Default)]
pub struct FileStorage;

impl SidecarStorage for FileStorage {
    fn read(&self, path: &Path) -> io::Result<Option<Vec<u8>>> {
        match std::fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&mut self, path: &Path, contents: &[u8]) -> io::Result<()> {
        std::fs::write(path, contents)
    }
}

/// In-memory sidecars keyed by path
///
/// Clones share the same map, so a test can keep one handle and inspect
/// what the store wrote through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    files: Arc<Mutex<HashMap<PathBuf, Vec<u8>>>>,
    fail_writes: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage whose writes always fail (for exercising write-failure paths)
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    /// Seed a document at `path`
    pub fn insert(&self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        self.lock().insert(path.into(), contents.into());
    }

    /// Current document at `path`
    pub fn get(&self, path: &Path) -> Option<Vec<u8>> {
        self.lock().get(path).cloned()
    }

    /// Number of documents held
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, Vec<u8>>> {
        // A poisoned map still holds valid bytes
        self.files.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SidecarStorage for MemoryStorage {
    fn read(&self, path: &Path) -> io::Result<Option<Vec<u8>>> {
        Ok(self.get(path))
    }

    fn write(&mut self, path: &Path, contents: &[u8]) -> io::Result<()> {
        if self.fail_writes {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "sidecar storage is read-only",
            ));
        }
        self.lock().insert(path.to_path_buf(), contents.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_storage_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage;
        assert!(storage.read(&dir.path().join("nope.easymarkers")).unwrap().is_none());
    }

    #[test]
    fn test_file_storage_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("take.wav.easymarkers");
        let mut storage = FileStorage;

        storage.write(&path, b"<Markers/>").unwrap();
        assert_eq!(storage.read(&path).unwrap(), Some(b"<Markers/>".to_vec()));
    }

    #[test]
    fn test_memory_storage_clones_share_files() {
        let observer = MemoryStorage::new();
        let mut writer = observer.clone();

        writer.write(Path::new("/a.easymarkers"), b"x").unwrap();

        assert_eq!(observer.get(Path::new("/a.easymarkers")), Some(b"x".to_vec()));
        assert_eq!(observer.len(), 1);
    }

    #[test]
    fn test_failing_storage_rejects_writes() {
        let mut storage = MemoryStorage::failing();
        assert!(storage.write(Path::new("/a.easymarkers"), b"x").is_err());
        assert!(storage.is_empty());
    }
}
