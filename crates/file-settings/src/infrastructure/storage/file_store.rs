//! `std::fs`-backed [`SettingsStore`].

use std::fs;
use std::io;
use std::path::Path;

use tracing::trace;

use crate::application::store::SettingsStore;

/// Stores settings files directly on the local file system.
///
/// Writes are plain overwrites: there is no temporary file, rename, or lock,
/// so concurrent writers to the same path race and the last write wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStore;

impl SettingsStore for FsStore {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read(&self, path: &Path) -> io::Result<String> {
        trace!(path = %path.display(), "reading settings file");
        fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        // Ensure directory exists before writing.
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        trace!(path = %path.display(), bytes = contents.len(), "writing settings file");
        fs::write(path, contents)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_creates_missing_parent_directories() {
        // Arrange
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("deep").join("settings.json");

        // Act
        FsStore.write(&path, "{}").unwrap();

        // Assert
        assert!(FsStore.is_file(&path));
        assert_eq!(FsStore.read(&path).unwrap(), "{}");
    }

    #[test]
    fn test_is_file_false_for_directory() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(!FsStore.is_file(tmp.path()));
    }

    #[test]
    fn test_is_file_false_for_missing_path() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(!FsStore.is_file(&tmp.path().join("absent.json")));
    }

    #[test]
    fn test_write_overwrites_existing_contents() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("settings.json");

        FsStore.write(&path, "{\"a\": 1, \"b\": 2}").unwrap();
        FsStore.write(&path, "{}").unwrap();

        assert_eq!(FsStore.read(&path).unwrap(), "{}");
    }

    #[test]
    fn test_write_onto_directory_path_fails() {
        // A directory occupying the target path makes the write fail.
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("settings.json");
        fs::create_dir(&path).unwrap();

        assert!(FsStore.write(&path, "{}").is_err());
    }

    #[test]
    fn test_read_missing_file_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let err = FsStore.read(&tmp.path().join("nope.json")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
