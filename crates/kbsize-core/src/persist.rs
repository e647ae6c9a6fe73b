//! Storage of compressed output.
//!
//! The compressor hands back bytes; where they go is up to the host. This
//! module defines that boundary and a directory-backed store for native
//! hosts.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

/// Folder created under the store root.
pub const OUTPUT_FOLDER: &str = "PhotoCompressor";

#[derive(Debug, Error)]
pub enum PersistError {
    /// The suggested name is empty or not a single path component.
    #[error("Invalid file name: {0:?}")]
    InvalidFileName(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Accepts final bytes and returns where they ended up.
pub trait ImageStore {
    type Location;

    fn persist(&self, bytes: &[u8], suggested_file_name: &str)
        -> Result<Self::Location, PersistError>;
}

/// Writes files into `<root>/PhotoCompressor/`.
///
/// A file is first written under a hidden pending name and renamed into place
/// once complete, so readers never see a partial image.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join(OUTPUT_FOLDER)
    }
}

impl ImageStore for DirectoryStore {
    type Location = PathBuf;

    fn persist(&self, bytes: &[u8], suggested_file_name: &str) -> Result<PathBuf, PersistError> {
        validate_file_name(suggested_file_name)?;

        let dir = self.output_dir();
        fs::create_dir_all(&dir)?;

        let pending = dir.join(format!(".{}.pending", suggested_file_name));
        let target = dir.join(suggested_file_name);

        if let Err(e) = fs::write(&pending, bytes).and_then(|_| fs::rename(&pending, &target)) {
            let _ = fs::remove_file(&pending);
            return Err(e.into());
        }

        log::debug!("Saved {} bytes to {}", bytes.len(), target.display());
        Ok(target)
    }
}

fn validate_file_name(name: &str) -> Result<(), PersistError> {
    let single_component = Path::new(name)
        .file_name()
        .map(|n| n == name)
        .unwrap_or(false);

    if name.is_empty() || name.starts_with('.') || !single_component {
        return Err(PersistError::InvalidFileName(name.to_string()));
    }
    Ok(())
}

/// `compressed_<unix millis>.jpg` for the current time.
pub fn suggested_file_name() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    suggested_file_name_at(millis)
}

/// `compressed_<millis>.jpg` for a caller-supplied timestamp.
pub fn suggested_file_name_at(unix_millis: u64) -> String {
    format!("compressed_{}.jpg", unix_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persist_writes_into_output_folder() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(dir.path());

        let location = store.persist(&[0xFF, 0xD8, 0xFF, 0xD9], "photo.jpg").unwrap();

        assert_eq!(location, dir.path().join("PhotoCompressor").join("photo.jpg"));
        assert_eq!(fs::read(&location).unwrap(), vec![0xFF, 0xD8, 0xFF, 0xD9]);
    }

    #[test]
    fn test_persist_leaves_no_pending_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(dir.path());
        store.persist(b"abc", "a.jpg").unwrap();

        let names: Vec<_> = fs::read_dir(store.output_dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["a.jpg".to_string()]);
    }

    #[test]
    fn test_persist_overwrites_existing() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(dir.path());

        store.persist(b"first", "same.jpg").unwrap();
        let location = store.persist(b"second", "same.jpg").unwrap();

        assert_eq!(fs::read(location).unwrap(), b"second");
    }

    #[test]
    fn test_persist_rejects_bad_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(dir.path());

        for name in ["", "../escape.jpg", "nested/name.jpg", ".hidden.jpg", ".."] {
            assert!(
                matches!(store.persist(b"x", name), Err(PersistError::InvalidFileName(_))),
                "name {:?} should be rejected",
                name
            );
        }
    }

    #[test]
    fn test_suggested_file_name_format() {
        assert_eq!(suggested_file_name_at(1_700_000_000_123), "compressed_1700000000123.jpg");

        let name = suggested_file_name();
        assert!(name.starts_with("compressed_"));
        assert!(name.ends_with(".jpg"));
    }
}
