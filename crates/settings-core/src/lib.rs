//! # settings-core
//!
//! Declarative, validated settings records with no file-system dependency.
//!
//! This crate is the validation half of the file-settings workspace.  The
//! `file-settings` crate builds on it to persist records as JSON files.
//!
//! # Overview
//!
//! - **`schema`** – Declare fields with [`Field`] constructors (`string`,
//!   `integer`, ...) and modifiers (`default`, `range`, `pattern`,
//!   `validator`, `env`, ...), collect them with [`Schema::builder`], and
//!   validate raw JSON mappings into normalized ones.  Every problem found
//!   is collected into one [`ValidationError`].
//!
//! - **`layering`** – [`resolve`] merges schema defaults, environment values
//!   and explicit values, in that order of increasing precedence.  The
//!   environment is passed in as an [`EnvSnapshot`], so resolution is a pure
//!   function.
//!
//! - **`validated`** – [`SettingsSchema`] ties a serde struct to its schema;
//!   [`Validated`] wraps a value of that struct and validates every change
//!   to it, so an invalid record can never be observed.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use serde::{Deserialize, Serialize};
//! use settings_core::{Field, Schema, SchemaError, SettingsSchema, Validated};
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
//! let schema = Arc::new(AppSettings::schema().unwrap());
//! let mut settings = Validated::<AppSettings>::defaults(schema).unwrap();
//! assert!(settings.set("max_connections", 1500).is_err());
//! assert_eq!(settings.max_connections, 100);
//! ```

pub mod layering;
pub mod schema;
pub mod validated;

pub use layering::{coerce, resolve, EnvSnapshot};
pub use schema::{
    Field, FieldKind, Issue, Schema, SchemaBuilder, SchemaError, ValidationError, Validator,
};
pub use validated::{SettingsSchema, Validated, DEFAULT_FILENAME};
