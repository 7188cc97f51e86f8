//! Staging store: temporary on-disk copies of uploaded content.
//!
//! Each in-flight item gets exactly one [`StagedFile`] under the store's
//! private root. Release is an explicit, idempotent operation invoked on
//! every exit path of item processing; `Drop` only backstops a path that
//! forgot.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, error};
use uuid::Uuid;

/// Allocates and deletes staged files under one root directory.
///
/// Safe for concurrent staging: file names are uuid-based, so items never
/// share a staged path.
pub struct StagingStore {
    root: PathBuf,
    // Held so a store created via `new_temp` cleans its root up on drop.
    _owned_root: Option<TempDir>,
}

impl StagingStore {
    /// Stage into an explicit directory, creating it if needed.
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            _owned_root: None,
        })
    }

    /// Stage into a process-private temp directory removed when the store
    /// is dropped.
    pub fn new_temp() -> io::Result<Self> {
        let dir = TempDir::new()?;
        Ok(Self {
            root: dir.path().to_path_buf(),
            _owned_root: Some(dir),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `content` to a fresh staged file carrying `extension`.
    pub fn stage(&self, content: &[u8], extension: &str) -> io::Result<StagedFile> {
        let name = if extension.is_empty() {
            Uuid::new_v4().to_string()
        } else {
            format!("{}.{}", Uuid::new_v4(), extension)
        };
        let path = self.root.join(name);
        fs::write(&path, content)?;
        debug!(path = %path.display(), size = content.len(), "Staged upload content");
        Ok(StagedFile {
            path,
            extension: extension.to_string(),
            released: false,
        })
    }
}

/// A temporary local copy of one item's content, exclusively owned by the
/// processing of that item.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
    extension: String,
    released: bool,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Delete the staged file. Idempotent: a second call is a no-op.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Released staged file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                error!(error = ?e, path = %self.path.display(), "Failed to remove staged file");
            }
        }
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_writes_content_with_extension() {
        let store = StagingStore::new_temp().unwrap();
        let staged = store.stage(b"hello", "pdf").unwrap();
        assert!(staged.path().exists());
        assert_eq!(staged.extension(), "pdf");
        assert_eq!(staged.path().extension().unwrap(), "pdf");
        assert_eq!(fs::read(staged.path()).unwrap(), b"hello");
    }

    #[test]
    fn release_is_idempotent() {
        let store = StagingStore::new_temp().unwrap();
        let mut staged = store.stage(b"x", "txt").unwrap();
        let path = staged.path().to_path_buf();
        staged.release();
        assert!(!path.exists());
        // Second release must be a no-op, not an error.
        staged.release();
        assert!(!path.exists());
    }

    #[test]
    fn drop_backstops_a_missed_release() {
        let store = StagingStore::new_temp().unwrap();
        let path = {
            let staged = store.stage(b"x", "txt").unwrap();
            staged.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn concurrent_items_never_share_a_path() {
        let store = StagingStore::new_temp().unwrap();
        let a = store.stage(b"a", "pdf").unwrap();
        let b = store.stage(b"b", "pdf").unwrap();
        assert_ne!(a.path(), b.path());
    }
}
