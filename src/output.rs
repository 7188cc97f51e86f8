//! Output store: durable keyed storage for translated artifacts.
//!
//! Filenames are sanitized before use as storage keys, and writes go
//! through a temp file plus rename so a name clash overwrites cleanly
//! instead of interleaving.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, error, info};

use crate::contract::extension_of;

/// Directory-backed `filename -> bytes` store for translated documents.
pub struct OutputStore {
    root: PathBuf,
}

impl OutputStore {
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist `content` under the sanitized `filename`, overwriting any
    /// previous artifact with the same name. The write is atomic (temp
    /// file + rename), so concurrent writers to one name leave exactly one
    /// intact winner.
    pub fn put(&self, filename: &str, content: &[u8]) -> io::Result<String> {
        let key = sanitize_filename(filename);
        let target = self.root.join(&key);
        let tmp = NamedTempFile::new_in(&self.root)?;
        fs::write(tmp.path(), content)?;
        tmp.persist(&target).map_err(|e| {
            error!(error = ?e.error, path = %target.display(), "Failed to persist output artifact");
            e.error
        })?;
        info!(filename = %key, size = content.len(), "Stored translated artifact");
        Ok(key)
    }

    pub fn exists(&self, filename: &str) -> bool {
        self.root.join(sanitize_filename(filename)).is_file()
    }

    /// Read an artifact back by filename, e.g. for download retrieval.
    pub fn get(&self, filename: &str) -> io::Result<Vec<u8>> {
        let path = self.root.join(sanitize_filename(filename));
        debug!(path = %path.display(), "Reading stored artifact");
        fs::read(path)
    }
}

/// Strip path components and filesystem-hostile characters so a caller
/// supplied name can never traverse outside the store.
pub fn sanitize_filename(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut clean = base.replace(
        &['/', '\\', ':', '*', '?', '"', '<', '>', '|'][..],
        "_",
    );
    while clean.starts_with('.') {
        clean.remove(0);
    }
    clean
}

/// Deterministic output name: `{basename}_{target_lang}.{ext}` with the
/// extension lowercased. A name without an extension yields
/// `{basename}_{target_lang}`.
pub fn translated_filename(original: &str, target_lang: &str) -> String {
    let ext = extension_of(original);
    let basename = match original.rsplit_once('.') {
        Some((base, _)) => base,
        None => original,
    };
    if ext.is_empty() {
        format!("{basename}_{target_lang}")
    } else {
        format!("{basename}_{target_lang}.{ext}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn put_get_exists_round() {
        let dir = tempdir().unwrap();
        let store = OutputStore::new(dir.path()).unwrap();
        assert!(!store.exists("report_DE.pdf"));
        store.put("report_DE.pdf", b"bytes").unwrap();
        assert!(store.exists("report_DE.pdf"));
        assert_eq!(store.get("report_DE.pdf").unwrap(), b"bytes");
    }

    #[test]
    fn put_overwrites_same_key() {
        let dir = tempdir().unwrap();
        let store = OutputStore::new(dir.path()).unwrap();
        store.put("a_DE.pdf", b"first").unwrap();
        store.put("a_DE.pdf", b"second").unwrap();
        assert_eq!(store.get("a_DE.pdf").unwrap(), b"second");
    }

    #[test]
    fn sanitize_blocks_path_traversal() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("..\\evil.pdf"), "_evil.pdf");
        assert_eq!(sanitize_filename("a:b*c.pdf"), "a_b_c.pdf");
        assert_eq!(sanitize_filename(".hidden"), "hidden");
    }

    #[test]
    fn translated_name_is_deterministic() {
        assert_eq!(translated_filename("report.pdf", "DE"), "report_DE.pdf");
        assert_eq!(translated_filename("Report.PDF", "EN-US"), "Report_EN-US.pdf");
        assert_eq!(translated_filename("notes", "DE"), "notes_DE");
    }
}
