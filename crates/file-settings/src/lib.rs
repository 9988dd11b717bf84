//! # file-settings
//!
//! Schema-validated application settings stored in a single JSON file.
//!
//! An application declares its settings as a serde struct plus a
//! [`Schema`] (see the `settings-core` crate, re-exported here), then uses
//! [`SettingsFile`] to create, load, and check for the file, and the returned
//! [`FileSettings`] handle to change and save it.
//!
//! ```rust,no_run
//! use serde::{Deserialize, Serialize};
//! use file_settings::{Field, Schema, SchemaError, SettingsFile, SettingsSchema};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! struct AppSettings {
//!     app_name: String,
//!     max_connections: u32,
//! }
//!
//! impl SettingsSchema for AppSettings {
//!     fn schema() -> Result<Schema, SchemaError> {
//!         Schema::builder()
//!             .field(Field::string("app_name").default("My App"))
//!             .field(Field::integer("max_connections").default(100).range(1, 1000))
//!             .build()
//!     }
//! }
//!
//! # fn main() -> Result<(), file_settings::Error> {
//! let file = SettingsFile::<AppSettings>::new()?;
//! let mut settings = file.load("./cfg", true)?;
//! settings.set("max_connections", 250)?;
//! settings.save()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Layout
//!
//! ```text
//! [file-settings]
//!   ├── error/            SettingsError (lifecycle) and Error (everything)
//!   ├── application/      SettingsFile / FileSettings use cases, SettingsStore port
//!   └── infrastructure/
//!         └── storage/    FsStore: std::fs adapter
//! ```
//!
//! # Errors at a glance
//!
//! | Situation                                  | Error                                  |
//! |--------------------------------------------|----------------------------------------|
//! | `load` without a file                      | `Error::Settings(SettingsError::NotFound)` |
//! | `create` over an existing file             | `Error::Settings(SettingsError::Exists)`   |
//! | bad JSON, bad values, extra keys           | `Error::Validation`                    |
//! | read / write failure                       | `Error::Read` / `Error::Write`         |

pub mod application;
pub mod error;
pub mod infrastructure;

pub use application::settings_file::{EnvSource, FileSettings, SettingsFile, SettingsFileConfig};
pub use application::store::SettingsStore;
pub use error::{Error, SettingsError};
pub use infrastructure::storage::FsStore;

pub use settings_core::{
    resolve, EnvSnapshot, Field, FieldKind, Issue, Schema, SchemaBuilder, SchemaError,
    SettingsSchema, Validated, ValidationError, Validator, DEFAULT_FILENAME,
};
