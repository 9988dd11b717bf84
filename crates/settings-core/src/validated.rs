//! Typed settings records whose every mutation is validated.

use std::ops::Deref;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::schema::{Schema, SchemaError, ValidationError};

/// Base name of the file a settings type is persisted to, unless the type
/// overrides [`SettingsSchema::FILENAME`].
pub const DEFAULT_FILENAME: &str = "settings.json";

/// A settings type: a serde struct paired with its declared [`Schema`].
///
/// Field names in the schema must match the struct's serialized field
/// names.
///
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use settings_core::{Field, Schema, SchemaError, SettingsSchema};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// struct AppSettings {
///     app_name: String,
///     max_connections: u32,
/// }
///
/// impl SettingsSchema for AppSettings {
///     const FILENAME: &'static str = "app.json";
///
///     fn schema() -> Result<Schema, SchemaError> {
///         Schema::builder()
///             .field(Field::string("app_name").default("My App"))
///             .field(Field::integer("max_connections").default(100).range(1, 1000))
///             .build()
///     }
/// }
/// ```
pub trait SettingsSchema: Serialize + DeserializeOwned + Clone {
    /// Base name of the JSON file this type is stored in.
    const FILENAME: &'static str = DEFAULT_FILENAME;

    /// Declares the fields, defaults, and constraints of this type.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] when the declaration itself is inconsistent.
    fn schema() -> Result<Schema, SchemaError>;
}

/// A settings value of type `S` that is known to satisfy its schema.
///
/// Read access goes through [`Deref`]. There is no mutable
/// access: [`Validated::set`] and [`Validated::update`] are the only ways to
/// change the value, and both leave it untouched when the result would be
/// invalid.
#[derive(Debug, Clone)]
pub struct Validated<S> {
    value: S,
    schema: Arc<Schema>,
}

impl<S: SettingsSchema> Validated<S> {
    /// Validates a raw mapping (after defaults are applied) and decodes it.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when `raw` fails the schema or cannot be
    /// decoded into `S`.
    pub fn from_map(schema: Arc<Schema>, raw: &Map<String, Value>) -> Result<Self, ValidationError> {
        let normalized = schema.validate(raw)?;
        let value = decode(normalized)?;
        Ok(Self { value, schema })
    }

    /// Like [`Validated::from_map`] for a whole JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the document is not an object or is
    /// invalid.
    pub fn from_value(schema: Arc<Schema>, raw: &Value) -> Result<Self, ValidationError> {
        let normalized = schema.validate_value(raw)?;
        let value = decode(normalized)?;
        Ok(Self { value, schema })
    }

    /// Wraps an existing value after checking it against the schema.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when `value` violates the schema.
    pub fn new(schema: Arc<Schema>, value: S) -> Result<Self, ValidationError> {
        let raw = encode(&value)?;
        Self::from_map(schema, &raw)
    }

    /// A record built purely from the schema's defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the schema has required fields.
    pub fn defaults(schema: Arc<Schema>) -> Result<Self, ValidationError> {
        Self::from_map(schema, &Map::new())
    }

    pub fn get(&self) -> &S {
        &self.value
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Assigns one field by its serialized name.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the field is unknown or the new value
    /// is invalid; the current value is kept.
    pub fn set<V: Serialize>(&mut self, field: &str, value: V) -> Result<(), ValidationError> {
        let value = serde_json::to_value(value)
            .map_err(|e| ValidationError::single(field, e.to_string()))?;
        let mut raw = self.to_map()?;
        raw.insert(field.to_string(), value);
        *self = Self::from_map(Arc::clone(&self.schema), &raw)?;
        Ok(())
    }

    /// Applies `change` to a copy of the value and keeps the copy only if it
    /// still satisfies the schema.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the changed value is invalid; the
    /// current value is kept.
    pub fn update<F>(&mut self, change: F) -> Result<(), ValidationError>
    where
        F: FnOnce(&mut S),
    {
        let mut candidate = self.value.clone();
        change(&mut candidate);
        *self = Self::new(Arc::clone(&self.schema), candidate)?;
        Ok(())
    }

    /// Checks the current value against the schema again and returns its
    /// normalized mapping.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if the value no longer validates.
    pub fn revalidate(&self) -> Result<Map<String, Value>, ValidationError> {
        self.schema.validate(&self.to_map()?)
    }

    /// The value as a JSON mapping keyed by field name.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if `S` does not serialize to an object.
    pub fn to_map(&self) -> Result<Map<String, Value>, ValidationError> {
        encode(&self.value)
    }

    /// Pretty-printed JSON (2-space indent, struct field order).
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, ValidationError> {
        serde_json::to_string_pretty(&self.value).map_err(|e| ValidationError::single("", e.to_string()))
    }

    pub fn into_inner(self) -> S {
        self.value
    }
}

impl<S> Deref for Validated<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.value
    }
}

impl<S: PartialEq> PartialEq for Validated<S> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

fn encode<S: Serialize>(value: &S) -> Result<Map<String, Value>, ValidationError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ValidationError::single(
            "",
            "Settings must serialize to a JSON object",
        )),
        Err(e) => Err(ValidationError::single("", e.to_string())),
    }
}

fn decode<S: DeserializeOwned>(normalized: Map<String, Value>) -> Result<S, ValidationError> {
    serde_json::from_value(Value::Object(normalized)).map_err(|e| ValidationError::single("", e.to_string()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
