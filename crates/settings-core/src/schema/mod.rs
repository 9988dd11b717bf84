//! Settings schema declaration.
//!
//! A [`Schema`] is an ordered list of [`Field`]s assembled with
//! [`SchemaBuilder`].  Building compiles string patterns and checks every
//! declared default against its own field, so a schema that builds
//! successfully can always produce a valid defaults-only record (provided
//! every field has a default).
//!
//! ```rust
//! use settings_core::{Field, Schema};
//!
//! let schema = Schema::builder()
//!     .field(Field::string("app_name").default("My App"))
//!     .field(Field::integer("max_connections").default(100).range(1, 1000))
//!     .build()
//!     .expect("schema is valid");
//!
//! assert_eq!(schema.fields().len(), 2);
//! ```

pub mod field;
pub mod validate;

use std::collections::HashSet;

use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

pub use field::{Field, FieldKind, Validator};
pub use validate::{Issue, ValidationError};

/// Errors in a schema declaration itself (programming errors, not data errors).
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Two fields share a name.
    #[error("duplicate field `{0}` in settings schema")]
    DuplicateField(String),

    /// A field was declared with an empty name.
    #[error("settings schema contains a field with an empty name")]
    EmptyFieldName,

    /// A `pattern` constraint is not a valid regular expression.
    #[error("invalid pattern for field `{field}`: {source}")]
    InvalidPattern {
        field: String,
        #[source]
        source: regex::Error,
    },

    /// A declared default violates the field's own constraints.
    #[error("default for field `{field}` is invalid: {reason}")]
    InvalidDefault { field: String, reason: String },
}

/// The declared set of typed, validated fields for one settings type.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<Field>,
    env_prefix: Option<String>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name() == name)
    }

    pub fn env_prefix(&self) -> Option<&str> {
        self.env_prefix.as_deref()
    }

    /// Mapping of every field that declares a default.
    pub fn defaults(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .filter_map(|f| f.default_value().map(|v| (f.name().to_string(), v.clone())))
            .collect()
    }

    /// Environment variable name consulted for `field`: its explicit alias,
    /// otherwise `env_prefix + NAME` when the schema has a prefix.
    pub fn env_name(&self, field: &Field) -> Option<String> {
        match (field.env_alias(), &self.env_prefix) {
            (Some(alias), _) => Some(alias.to_string()),
            (None, Some(prefix)) => Some(format!("{prefix}{}", field.name()).to_uppercase()),
            (None, None) => None,
        }
    }
}

/// Builder for [`Schema`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    fields: Vec<Field>,
    env_prefix: Option<String>,
}

impl SchemaBuilder {
    /// Appends a field. Declaration order is validation order.
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Prefix used to derive environment names for fields without an alias.
    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Finishes the declaration.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] on duplicate or empty field names, invalid
    /// patterns, or defaults that fail their own field's checks.
    pub fn build(mut self) -> Result<Schema, SchemaError> {
        let mut seen = HashSet::new();
        for field in &mut self.fields {
            if field.name.is_empty() {
                return Err(SchemaError::EmptyFieldName);
            }
            if !seen.insert(field.name.clone()) {
                return Err(SchemaError::DuplicateField(field.name.clone()));
            }
            if let Some(pattern) = &field.pattern {
                let compiled = Regex::new(pattern).map_err(|source| SchemaError::InvalidPattern {
                    field: field.name.clone(),
                    source,
                })?;
                field.compiled_pattern = Some(compiled);
            }
        }

        for field in &self.fields {
            if let Some(default) = field.default_value() {
                let mut issues = Vec::new();
                if field.check(field.name(), default, &mut issues).is_none() {
                    let reason = issues
                        .into_iter()
                        .map(|issue| issue.message)
                        .collect::<Vec<_>>()
                        .join("; ");
                    return Err(SchemaError::InvalidDefault {
                        field: field.name().to_string(),
                        reason,
                    });
                }
            }
        }

        tracing::trace!(fields = self.fields.len(), "settings schema built");
        Ok(Schema {
            fields: self.fields,
            env_prefix: self.env_prefix,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
