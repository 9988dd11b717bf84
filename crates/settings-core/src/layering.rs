//! Layered value resolution: defaults < environment < explicit values.
//!
//! [`resolve`] is a pure function over an [`EnvSnapshot`], so precedence can
//! be tested without touching the real process environment.  Only
//! [`EnvSnapshot::capture`] reads `std::env`.
//!
//! Environment values are text; each one is coerced to the kind of the field
//! it feeds before being layered:
//!
//! | Field kind            | Accepted text                                  |
//! |-----------------------|------------------------------------------------|
//! | `Bool`                | `true/false`, `1/0`, `yes/no`, `on/off`        |
//! | `Integer`             | decimal integer                                |
//! | `Float`               | any finite decimal number                      |
//! | `String`              | used verbatim                                  |
//! | `Array`, `Object`     | a JSON document                                |
//! | `Any`                 | a JSON document, otherwise the raw string      |

use std::collections::HashMap;

use serde_json::{Map, Number, Value};
use tracing::trace;

use crate::schema::{FieldKind, Issue, Schema, ValidationError};

/// An owned copy of environment variables, keyed case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies the current process environment. Variables whose name or
    /// value is not valid Unicode are skipped.
    pub fn capture() -> Self {
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into().to_lowercase(), value.into());
    }

    /// Looks `name` up ignoring ASCII and Unicode case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for EnvSnapshot
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut snapshot = Self::new();
        for (k, v) in iter {
            snapshot.insert(k, v);
        }
        snapshot
    }
}

/// Merges the three input layers for `schema` into one raw mapping.
///
/// The result is *not* validated; pass it to [`Schema::validate`].  Explicit
/// keys that the schema does not declare are carried through unchanged so
/// that validation can report them.
///
/// # Errors
///
/// Returns [`ValidationError`] when an environment variable is present for a
/// field but cannot be coerced to that field's kind.  Fields supplied by
/// `explicit` never consult the environment.
pub fn resolve(
    schema: &Schema,
    env: &EnvSnapshot,
    explicit: &Map<String, Value>,
) -> Result<Map<String, Value>, ValidationError> {
    let mut resolved = schema.defaults();
    let mut issues = Vec::new();

    for field in schema.fields() {
        if explicit.contains_key(field.name()) {
            continue;
        }
        let Some(var) = schema.env_name(field) else {
            continue;
        };
        let Some(raw) = env.get(&var) else {
            continue;
        };
        match coerce(field.kind(), raw) {
            Ok(value) => {
                trace!(field = field.name(), var = %var, "settings value taken from environment");
                resolved.insert(field.name().to_string(), value);
            }
            Err(reason) => issues.push(Issue::new(
                field.name(),
                format!("{reason} (from environment variable `{var}`)"),
            )),
        }
    }

    if !issues.is_empty() {
        return Err(ValidationError::new(issues));
    }

    for (key, value) in explicit {
        resolved.insert(key.clone(), value.clone());
    }
    Ok(resolved)
}

/// Converts environment text into a JSON value of the given kind.
pub fn coerce(kind: &FieldKind, raw: &str) -> Result<Value, String> {
    let text = raw.trim();
    match kind {
        FieldKind::Bool => match text.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Value::Bool(true)),
            "false" | "0" | "no" | "off" => Ok(Value::Bool(false)),
            _ => Err("Input should be a valid boolean".to_string()),
        },
        FieldKind::Integer => text
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| "Input should be a valid integer".to_string()),
        FieldKind::Float => text
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| "Input should be a valid number".to_string()),
        FieldKind::String => Ok(Value::String(raw.to_string())),
        FieldKind::Array(_) | FieldKind::Object(_) => {
            serde_json::from_str(text).map_err(|e| format!("Invalid JSON: {e}"))
        }
        FieldKind::Any => Ok(serde_json::from_str(text).unwrap_or_else(|_| Value::String(raw.to_string()))),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Field;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::builder()
            .field(Field::string("app_name").default("My App").env("APP_NAME"))
            .field(Field::integer("max_connections").default(100).env("APP_MAX_CONNECTIONS"))
            .field(Field::boolean("debug").default(false).env("APP_DEBUG"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_resolve_defaults_only() {
        let out = resolve(&schema(), &EnvSnapshot::new(), &Map::new()).unwrap();
        assert_eq!(out["app_name"], json!("My App"));
        assert_eq!(out["max_connections"], json!(100));
    }

    #[test]
    fn test_environment_overrides_defaults() {
        // Arrange
        let env: EnvSnapshot = [("APP_MAX_CONNECTIONS", "250"), ("APP_DEBUG", "yes")]
            .into_iter()
            .collect();

        // Act
        let out = resolve(&schema(), &env, &Map::new()).unwrap();

        // Assert
        assert_eq!(out["max_connections"], json!(250));
        assert_eq!(out["debug"], json!(true));
        assert_eq!(out["app_name"], json!("My App"));
    }

    #[test]
    fn test_explicit_values_override_environment() {
        let env: EnvSnapshot = [("APP_NAME", "From Env")].into_iter().collect();
        let mut explicit = Map::new();
        explicit.insert("app_name".into(), json!("Explicit"));

        let out = resolve(&schema(), &env, &explicit).unwrap();

        assert_eq!(out["app_name"], json!("Explicit"));
    }

    #[test]
    fn test_environment_lookup_is_case_insensitive() {
        let env: EnvSnapshot = [("app_name", "lower")].into_iter().collect();
        let out = resolve(&schema(), &env, &Map::new()).unwrap();
        assert_eq!(out["app_name"], json!("lower"));
    }

    #[test]
    fn test_uncoercible_environment_value_names_the_variable() {
        let env: EnvSnapshot = [("APP_MAX_CONNECTIONS", "lots")].into_iter().collect();

        let err = resolve(&schema(), &env, &Map::new()).unwrap_err();

        let issue = err.issue_at("max_connections").unwrap();
        assert!(issue.message.contains("APP_MAX_CONNECTIONS"), "{}", issue.message);
    }

    #[test]
    fn test_uncoercible_environment_value_is_ignored_when_explicit_supplies_field() {
        // Arrange
        let env: EnvSnapshot = [("APP_MAX_CONNECTIONS", "lots"), ("APP_DEBUG", "on")]
            .into_iter()
            .collect();
        let mut explicit = Map::new();
        explicit.insert("max_connections".into(), json!(5));

        // Act
        let out = resolve(&schema(), &env, &explicit).unwrap();

        // Assert
        assert_eq!(out["max_connections"], json!(5));
        assert_eq!(out["debug"], json!(true));
    }

    #[test]
    fn test_unaliased_fields_ignore_environment() {
        let schema = Schema::builder()
            .field(Field::string("name").default("d"))
            .build()
            .unwrap();
        let env: EnvSnapshot = [("NAME", "env")].into_iter().collect();

        let out = resolve(&schema, &env, &Map::new()).unwrap();

        assert_eq!(out["name"], json!("d"));
    }

    #[test]
    fn test_prefix_derives_environment_names() {
        let schema = Schema::builder()
            .env_prefix("MYAPP_")
            .field(Field::integer("workers").default(1))
            .build()
            .unwrap();
        let env: EnvSnapshot = [("MYAPP_WORKERS", "8")].into_iter().collect();

        let out = resolve(&schema, &env, &Map::new()).unwrap();

        assert_eq!(out["workers"], json!(8));
    }

    #[test]
    fn test_coerce_collections_from_json_text() {
        let list = coerce(&FieldKind::Array(None), r#"["a", "b"]"#).unwrap();
        assert_eq!(list, json!(["a", "b"]));

        let err = coerce(&FieldKind::Object(None), "{not json").unwrap_err();
        assert!(err.starts_with("Invalid JSON"));
    }

    #[test]
    fn test_coerce_any_falls_back_to_string() {
        assert_eq!(coerce(&FieldKind::Any, "42").unwrap(), json!(42));
        assert_eq!(coerce(&FieldKind::Any, "hello").unwrap(), json!("hello"));
    }

    #[test]
    fn test_coerce_float_rejects_non_finite() {
        assert!(coerce(&FieldKind::Float, "NaN").is_err());
        assert_eq!(coerce(&FieldKind::Float, "0.5").unwrap(), json!(0.5));
    }
}
