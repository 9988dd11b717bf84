//! Settings-file use cases: `exists`, `create`, `load`, `save`.
//!
//! [`SettingsFile`] is the unbound component: a settings type `S`, its
//! compiled schema, a [`SettingsFileConfig`], and a storage backend.  Its
//! `create` and `load` return a [`FileSettings`] handle, which is bound to the
//! directory it came from and can `save` back to it.
//!
//! ```text
//! SettingsFile<S>  ──create/load──►  FileSettings<S>  ──save──►  FileSettings<S>
//!   (unbound)                          (bound to dir)              (file updated)
//! ```
//!
//! Values are layered as defaults < environment < explicit values (for
//! `create`) or file contents (for `load`), then validated as a whole.

use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use settings_core::{resolve, EnvSnapshot, Schema, SettingsSchema, Validated, ValidationError};
use tracing::debug;

use crate::application::store::SettingsStore;
use crate::error::{Error, SettingsError};
use crate::infrastructure::storage::FsStore;

/// Where environment-sourced values come from.
#[derive(Debug, Clone, Default)]
pub enum EnvSource {
    /// Snapshot the process environment at each `create`/`load`.
    #[default]
    Process,
    /// Use a fixed set of variables.
    Fixed(EnvSnapshot),
    /// Ignore the environment entirely.
    Disabled,
}

impl EnvSource {
    pub fn snapshot(&self) -> EnvSnapshot {
        match self {
            EnvSource::Process => EnvSnapshot::capture(),
            EnvSource::Fixed(snapshot) => snapshot.clone(),
            EnvSource::Disabled => EnvSnapshot::new(),
        }
    }
}

/// Per-type configuration of a [`SettingsFile`].
#[derive(Debug, Clone)]
pub struct SettingsFileConfig {
    /// Base name of the JSON file inside the settings directory.
    pub filename: String,
    pub env: EnvSource,
}

impl SettingsFileConfig {
    /// Configuration using `S::FILENAME` and the process environment.
    pub fn for_schema<S: SettingsSchema>() -> Self {
        Self {
            filename: S::FILENAME.to_string(),
            env: EnvSource::default(),
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    pub fn with_env(mut self, env: EnvSource) -> Self {
        self.env = env;
        self
    }
}

impl Default for SettingsFileConfig {
    fn default() -> Self {
        Self {
            filename: settings_core::DEFAULT_FILENAME.to_string(),
            env: EnvSource::default(),
        }
    }
}

/// Turns `directory` into an absolute path without touching the file system
/// beyond reading the working directory.
fn resolve_dir(directory: &Path) -> PathBuf {
    if directory.is_absolute() {
        return directory.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(directory))
        .unwrap_or_else(|_| directory.to_path_buf())
}

// ── SettingsFile ──────────────────────────────────────────────────────────────

/// Creates, loads and checks for the JSON settings file of type `S`.
pub struct SettingsFile<S, St = FsStore> {
    config: SettingsFileConfig,
    schema: Arc<Schema>,
    store: Arc<St>,
    _settings: PhantomData<fn() -> S>,
}

impl<S: SettingsSchema> SettingsFile<S> {
    /// Component for `S` using its own filename, the process environment,
    /// and the local file system.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if `S::schema()` fails.
    pub fn new() -> Result<Self, Error> {
        Self::with_config(SettingsFileConfig::for_schema::<S>())
    }

    /// # Errors
    ///
    /// Returns [`Error::Schema`] if `S::schema()` fails.
    pub fn with_config(config: SettingsFileConfig) -> Result<Self, Error> {
        Self::with_store(config, FsStore)
    }
}

impl<S: SettingsSchema, St: SettingsStore> SettingsFile<S, St> {
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if `S::schema()` fails.
    pub fn with_store(config: SettingsFileConfig, store: St) -> Result<Self, Error> {
        let schema = Arc::new(S::schema()?);
        Ok(Self {
            config,
            schema,
            store: Arc::new(store),
            _settings: PhantomData,
        })
    }

    pub fn config(&self) -> &SettingsFileConfig {
        &self.config
    }

    pub fn filename(&self) -> &str {
        &self.config.filename
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Absolute path of the settings file inside `directory`.
    pub fn path_in(&self, directory: impl AsRef<Path>) -> PathBuf {
        resolve_dir(directory.as_ref()).join(&self.config.filename)
    }

    /// Whether a regular settings file is present in `directory`.
    ///
    /// Performs no validation and has no side effects.
    pub fn exists(&self, directory: impl AsRef<Path>) -> bool {
        self.store.is_file(&self.path_in(directory))
    }

    /// Writes a new settings file built from defaults, environment values,
    /// and `values` (highest precedence).
    ///
    /// # Errors
    ///
    /// - [`SettingsError::Exists`] if the file exists and `exists_ok` is
    ///   false; the file is left untouched.
    /// - [`Error::Validation`] if the resolved values fail the schema;
    ///   nothing is written.
    /// - [`Error::Write`] if the file cannot be written.
    pub fn create(
        &self,
        directory: impl AsRef<Path>,
        values: Option<Map<String, Value>>,
        exists_ok: bool,
    ) -> Result<FileSettings<S, St>, Error> {
        let directory = resolve_dir(directory.as_ref());
        let path = directory.join(&self.config.filename);

        if !exists_ok && self.store.is_file(&path) {
            return Err(SettingsError::Exists {
                filename: self.config.filename.clone(),
                directory,
            }
            .into());
        }

        let explicit = values.unwrap_or_default();
        let raw = resolve(&self.schema, &self.config.env.snapshot(), &explicit)?;
        let settings = Validated::from_map(Arc::clone(&self.schema), &raw)?;

        let bound = self.bind(settings, directory);
        bound.save()?;
        debug!(path = %path.display(), "settings file created");
        Ok(bound)
    }

    /// Like [`SettingsFile::create`], taking the explicit values as any
    /// serializable object (a struct, a `HashMap`, a `json!` literal).
    ///
    /// # Errors
    ///
    /// As for [`SettingsFile::create`]; values that do not serialize to a
    /// JSON object are a validation error.
    pub fn create_with<V: Serialize>(
        &self,
        directory: impl AsRef<Path>,
        values: &V,
        exists_ok: bool,
    ) -> Result<FileSettings<S, St>, Error> {
        let values = match serde_json::to_value(values) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                return Err(ValidationError::single("", "Input should be a valid object").into())
            }
            Err(e) => return Err(ValidationError::single("", e.to_string()).into()),
        };
        self.create(directory, Some(values), exists_ok)
    }

    /// Reads and validates the settings file in `directory`.
    ///
    /// Keys absent from the file fall back to environment values, then to
    /// schema defaults.
    ///
    /// # Errors
    ///
    /// - [`SettingsError::NotFound`] if there is no file and
    ///   `create_if_missing` is false; nothing is created.
    /// - [`Error::Validation`] if the file is not a JSON object or its data
    ///   fails the schema.
    /// - [`Error::Read`] / [`Error::Write`] for I/O failures.
    pub fn load(
        &self,
        directory: impl AsRef<Path>,
        create_if_missing: bool,
    ) -> Result<FileSettings<S, St>, Error> {
        let directory = resolve_dir(directory.as_ref());
        let path = directory.join(&self.config.filename);

        if !self.store.is_file(&path) {
            if create_if_missing {
                debug!(path = %path.display(), "settings file missing; creating defaults");
                return self.create(&directory, None, true);
            }
            return Err(SettingsError::NotFound {
                filename: self.config.filename.clone(),
                directory,
            }
            .into());
        }

        let text = self
            .store
            .read(&path)
            .map_err(|source| Error::Read {
                path: path.clone(),
                source,
            })?;
        let document: Value =
            serde_json::from_str(&text).map_err(|e| ValidationError::malformed_json(&e))?;
        let Value::Object(file_values) = document else {
            return Err(ValidationError::single("", "Input should be a valid object").into());
        };

        let raw = resolve(&self.schema, &self.config.env.snapshot(), &file_values)?;
        let settings = Validated::from_map(Arc::clone(&self.schema), &raw)?;
        debug!(path = %path.display(), "settings file loaded");
        Ok(self.bind(settings, directory))
    }

    fn bind(&self, settings: Validated<S>, directory: PathBuf) -> FileSettings<S, St> {
        FileSettings {
            settings,
            directory,
            filename: self.config.filename.clone(),
            store: Arc::clone(&self.store),
        }
    }
}

impl<S, St> Clone for SettingsFile<S, St> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            schema: Arc::clone(&self.schema),
            store: Arc::clone(&self.store),
            _settings: PhantomData,
        }
    }
}

impl<S, St> fmt::Debug for SettingsFile<S, St> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsFile")
            .field("config", &self.config)
            .field("fields", &self.schema.fields().len())
            .finish()
    }
}

// ── FileSettings ──────────────────────────────────────────────────────────────

/// A validated settings value bound to the directory it was created in or
/// loaded from.
///
/// Dereferences to `S` for reading. Changes go through [`FileSettings::set`]
/// or [`FileSettings::update`] and are validated immediately; they reach
/// disk on [`FileSettings::save`].
pub struct FileSettings<S, St = FsStore> {
    settings: Validated<S>,
    directory: PathBuf,
    filename: String,
    store: Arc<St>,
}

impl<S: SettingsSchema, St: SettingsStore> FileSettings<S, St> {
    /// Absolute directory the handle is bound to.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.filename)
    }

    pub fn settings(&self) -> &Validated<S> {
        &self.settings
    }

    /// Assigns one field by name. See [`Validated::set`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the value is invalid; nothing changes.
    pub fn set<V: Serialize>(&mut self, field: &str, value: V) -> Result<(), ValidationError> {
        self.settings.set(field, value)
    }

    /// Applies a change atomically. See [`Validated::update`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the result is invalid; nothing changes.
    pub fn update<F: FnOnce(&mut S)>(&mut self, change: F) -> Result<(), ValidationError> {
        self.settings.update(change)
    }

    /// Re-validates the current value and overwrites the settings file.
    ///
    /// Output is pretty-printed JSON with 2-space indentation and keys in
    /// struct order, so saving an unchanged value twice yields identical
    /// bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the value no longer validates (nothing
    /// is written) or [`Error::Write`] if the file cannot be written.
    pub fn save(&self) -> Result<(), Error> {
        self.write_to(&self.path())
    }

    /// Saves into `directory` instead and rebinds the handle to it once the
    /// write succeeds.
    ///
    /// # Errors
    ///
    /// As for [`FileSettings::save`]; on failure the handle keeps its old
    /// directory.
    pub fn save_to(&mut self, directory: impl AsRef<Path>) -> Result<(), Error> {
        let directory = resolve_dir(directory.as_ref());
        self.write_to(&directory.join(&self.filename))?;
        self.directory = directory;
        Ok(())
    }

    fn write_to(&self, path: &Path) -> Result<(), Error> {
        self.settings.revalidate()?;
        let contents = self.settings.to_json_pretty()?;
        self.store
            .write(path, &contents)
            .map_err(|source| Error::Write {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(path = %path.display(), "settings saved");
        Ok(())
    }

    pub fn into_inner(self) -> S {
        self.settings.into_inner()
    }
}

impl<S, St> Deref for FileSettings<S, St> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.settings
    }
}

impl<S: fmt::Debug, St> fmt::Debug for FileSettings<S, St> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileSettings")
            .field("settings", self.settings.deref())
            .field("directory", &self.directory)
            .field("filename", &self.filename)
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
