//! Error taxonomy for settings-file operations.
//!
//! Two layers:
//!
//! - [`SettingsError`] is the settings-file *lifecycle* category: the file is
//!   missing when it must exist, or present when it must not.  Matching on
//!   `Error::Settings(_)` catches exactly these two and nothing else.
//! - [`Error`] is what every operation returns.  Data problems stay
//!   [`ValidationError`]s and OS failures stay I/O errors, each under its own
//!   variant, so they are never mistaken for lifecycle errors.

use std::io;
use std::path::PathBuf;

use settings_core::{SchemaError, ValidationError};
use thiserror::Error;

/// The settings file is missing or already present.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// `load` found no file and the caller did not ask for one to be created.
    #[error("`{filename}` not found in `{}`", directory.display())]
    NotFound { filename: String, directory: PathBuf },

    /// `create` found a file and the caller did not allow overwriting it.
    #[error("`{filename}` already exists in `{}`", directory.display())]
    Exists { filename: String, directory: PathBuf },
}

/// Any failure of a settings-file operation.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// File contents or supplied values failed the schema, or the file is not
    /// JSON.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The settings type's schema declaration is itself invalid.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The settings file could not be read.
    #[error("Failed to read settings from {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The settings file could not be written.
    #[error("Failed to save settings to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// The lifecycle error, if this is one.
    pub fn as_settings_error(&self) -> Option<&SettingsError> {
        match self {
            Error::Settings(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Settings(SettingsError::NotFound { .. }))
    }

    pub fn is_exists(&self) -> bool {
        matches!(self, Error::Settings(SettingsError::Exists { .. }))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// True for read and write failures reported by the operating system.
    pub fn is_io(&self) -> bool {
        matches!(self, Error::Read { .. } | Error::Write { .. })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
