//! The storage port used by the settings-file use cases.

use std::io;
use std::path::Path;

/// Text storage addressed by path.
///
/// The production implementation is
/// [`FsStore`](crate::infrastructure::storage::FsStore); tests substitute a
/// mock to exercise failure paths that are hard to provoke on a real disk.
#[cfg_attr(test, mockall::automock)]
pub trait SettingsStore {
    /// Whether a regular file exists at `path`.
    fn is_file(&self, path: &Path) -> bool;

    /// Reads the whole file as UTF-8 text.
    fn read(&self, path: &Path) -> io::Result<String>;

    /// Replaces the file's contents, creating parent directories as needed.
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;
}
