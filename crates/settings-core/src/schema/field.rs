//! Field declarations: kind, default, constraints, validators, env alias.
//!
//! A [`Field`] is built with a constructor naming its kind and then refined
//! with chained modifiers:
//!
//! ```rust
//! use settings_core::Field;
//!
//! let field = Field::integer("max_connections")
//!     .default(100)
//!     .range(1, 1000)
//!     .env("APP_MAX_CONNECTIONS");
//! assert_eq!(field.name(), "max_connections");
//! assert!(!field.is_required());
//! ```

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde_json::Value;

use super::validate::Issue;
use super::Schema;

/// A custom check run against a field's value after the built-in checks pass.
///
/// Returning `Err(message)` records `message` as a validation issue for the
/// field.
pub type Validator = Arc<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;

/// The JSON-level type a field accepts.
#[derive(Debug, Clone)]
pub enum FieldKind {
    Bool,
    /// Integers; whole floats such as `3.0` are accepted and stored as `3`.
    Integer,
    /// Any JSON number.
    Float,
    String,
    /// A JSON array, optionally with every item checked against a kind.
    Array(Option<Box<FieldKind>>),
    /// A JSON object, optionally validated against a nested schema.
    Object(Option<Schema>),
    /// Any JSON value; only constraints and validators apply.
    Any,
}

impl FieldKind {
    /// Human-readable name used in validation messages.
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Bool => "boolean",
            FieldKind::Integer => "integer",
            FieldKind::Float => "number",
            FieldKind::String => "string",
            FieldKind::Array(_) => "list",
            FieldKind::Object(_) => "object",
            FieldKind::Any => "value",
        }
    }
}

/// One declared settings field.
#[derive(Clone)]
pub struct Field {
    pub(crate) name: String,
    pub(crate) kind: FieldKind,
    pub(crate) default: Option<Value>,
    pub(crate) nullable: bool,
    pub(crate) minimum: Option<f64>,
    pub(crate) maximum: Option<f64>,
    pub(crate) min_length: Option<usize>,
    pub(crate) max_length: Option<usize>,
    pub(crate) pattern: Option<String>,
    pub(crate) compiled_pattern: Option<Regex>,
    pub(crate) choices: Vec<Value>,
    pub(crate) validators: Vec<Validator>,
    pub(crate) env: Option<String>,
    pub(crate) description: Option<String>,
}

impl Field {
    fn with_kind(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
            nullable: false,
            minimum: None,
            maximum: None,
            min_length: None,
            max_length: None,
            pattern: None,
            compiled_pattern: None,
            choices: Vec::new(),
            validators: Vec::new(),
            env: None,
            description: None,
        }
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::with_kind(name, FieldKind::Bool)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::with_kind(name, FieldKind::Integer)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::with_kind(name, FieldKind::Float)
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::with_kind(name, FieldKind::String)
    }

    pub fn array(name: impl Into<String>) -> Self {
        Self::with_kind(name, FieldKind::Array(None))
    }

    pub fn object(name: impl Into<String>) -> Self {
        Self::with_kind(name, FieldKind::Object(None))
    }

    pub fn any(name: impl Into<String>) -> Self {
        Self::with_kind(name, FieldKind::Any)
    }

    // ── Modifiers ─────────────────────────────────────────────────────────────

    /// Value used when the key is absent from every input layer.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Removes any default, making the field mandatory.
    pub fn required(mut self) -> Self {
        self.default = None;
        self
    }

    /// Accepts JSON `null` in addition to the field's kind.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Inclusive lower bound for numeric fields.
    pub fn minimum(mut self, min: impl Into<f64>) -> Self {
        self.minimum = Some(min.into());
        self
    }

    /// Inclusive upper bound for numeric fields.
    pub fn maximum(mut self, max: impl Into<f64>) -> Self {
        self.maximum = Some(max.into());
        self
    }

    /// Inclusive `[min, max]` bound for numeric fields.
    pub fn range(self, min: impl Into<f64>, max: impl Into<f64>) -> Self {
        self.minimum(min).maximum(max)
    }

    /// Minimum character count for strings, item count for lists and objects.
    pub fn min_length(mut self, len: usize) -> Self {
        self.min_length = Some(len);
        self
    }

    /// Maximum character count for strings, item count for lists and objects.
    pub fn max_length(mut self, len: usize) -> Self {
        self.max_length = Some(len);
        self
    }

    /// Regular expression a string value must match.
    ///
    /// The expression is compiled when the schema is built; an invalid
    /// expression makes [`SchemaBuilder::build`](super::SchemaBuilder::build)
    /// fail.
    pub fn pattern(mut self, regex: impl Into<String>) -> Self {
        self.pattern = Some(regex.into());
        self
    }

    /// Restricts the value to one of `choices`.
    pub fn one_of<I, V>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    /// Checks every item of a list field against `kind`.
    pub fn items(mut self, kind: FieldKind) -> Self {
        if let FieldKind::Array(items) = &mut self.kind {
            *items = Some(Box::new(kind));
        }
        self
    }

    /// Validates an object field against a nested schema.
    pub fn nested(mut self, schema: Schema) -> Self {
        if let FieldKind::Object(nested) = &mut self.kind {
            *nested = Some(schema);
        }
        self
    }

    /// Appends a custom validator. Validators run in the order they were added.
    pub fn validator<F>(mut self, check: F) -> Self
    where
        F: Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validators.push(Arc::new(check));
        self
    }

    /// Environment variable consulted for this field (case-insensitive).
    pub fn env(mut self, name: impl Into<String>) -> Self {
        self.env = Some(name.into());
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }

    pub fn env_alias(&self) -> Option<&str> {
        self.env.as_deref()
    }

    pub fn description_text(&self) -> Option<&str> {
        self.description.as_deref()
    }

    // ── Checking ──────────────────────────────────────────────────────────────

    /// Checks `value` and returns its normalized form, or records issues
    /// under `path` and returns `None`.
    pub(crate) fn check(&self, path: &str, value: &Value, issues: &mut Vec<Issue>) -> Option<Value> {
        if value.is_null() {
            if self.nullable {
                return Some(Value::Null);
            }
            issues.push(Issue::new(
                path,
                format!("Input should be a valid {}", self.kind.name()),
            ));
            return None;
        }

        let normalized = check_kind(&self.kind, path, value, issues)?;

        let before = issues.len();
        self.check_constraints(path, &normalized, issues);
        if issues.len() > before {
            return None;
        }

        for validator in &self.validators {
            if let Err(message) = validator(&normalized) {
                issues.push(Issue::new(path, message));
                return None;
            }
        }
        Some(normalized)
    }

    fn check_constraints(&self, path: &str, value: &Value, issues: &mut Vec<Issue>) {
        if let Some(n) = value.as_f64() {
            if let Some(min) = self.minimum {
                if n < min {
                    issues.push(Issue::new(
                        path,
                        format!("Input should be greater than or equal to {}", fmt_bound(min)),
                    ));
                }
            }
            if let Some(max) = self.maximum {
                if n > max {
                    issues.push(Issue::new(
                        path,
                        format!("Input should be less than or equal to {}", fmt_bound(max)),
                    ));
                }
            }
        }

        if let Some((len, unit)) = measure(value) {
            if let Some(min) = self.min_length {
                if len < min {
                    issues.push(Issue::new(
                        path,
                        format!("{} should have at least {min} {unit}", container_name(value)),
                    ));
                }
            }
            if let Some(max) = self.max_length {
                if len > max {
                    issues.push(Issue::new(
                        path,
                        format!("{} should have at most {max} {unit}", container_name(value)),
                    ));
                }
            }
        }

        if let (Some(regex), Some(text)) = (&self.compiled_pattern, value.as_str()) {
            if !regex.is_match(text) {
                issues.push(Issue::new(
                    path,
                    format!("String should match pattern '{}'", regex.as_str()),
                ));
            }
        }

        if !self.choices.is_empty() && !self.choices.contains(value) {
            let listed: Vec<String> = self.choices.iter().map(Value::to_string).collect();
            issues.push(Issue::new(
                path,
                format!("Input should be one of {}", listed.join(", ")),
            ));
        }
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("default", &self.default)
            .field("nullable", &self.nullable)
            .field("minimum", &self.minimum)
            .field("maximum", &self.maximum)
            .field("min_length", &self.min_length)
            .field("max_length", &self.max_length)
            .field("pattern", &self.pattern)
            .field("choices", &self.choices)
            .field("validators", &self.validators.len())
            .field("env", &self.env)
            .finish()
    }
}

/// Type-checks `value` against `kind`, returning the normalized value.
pub(crate) fn check_kind(
    kind: &FieldKind,
    path: &str,
    value: &Value,
    issues: &mut Vec<Issue>,
) -> Option<Value> {
    let mismatch = |issues: &mut Vec<Issue>| {
        issues.push(Issue::new(
            path,
            format!("Input should be a valid {}", kind.name()),
        ));
        None
    };

    match kind {
        FieldKind::Bool if value.is_boolean() => Some(value.clone()),
        FieldKind::Integer if value.is_i64() || value.is_u64() => Some(value.clone()),
        FieldKind::Integer => match value.as_f64() {
            Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                Some(Value::from(f as i64))
            }
            _ => mismatch(issues),
        },
        FieldKind::Float if value.is_number() => Some(value.clone()),
        FieldKind::String if value.is_string() => Some(value.clone()),
        FieldKind::Array(items) => {
            let Some(list) = value.as_array() else {
                return mismatch(issues);
            };
            let Some(item_kind) = items else {
                return Some(value.clone());
            };
            let before = issues.len();
            let checked: Vec<Value> = list
                .iter()
                .enumerate()
                .filter_map(|(i, item)| {
                    check_kind(item_kind, &format!("{path}[{i}]"), item, issues)
                })
                .collect();
            (issues.len() == before).then(|| Value::Array(checked))
        }
        FieldKind::Object(nested) => {
            let Some(map) = value.as_object() else {
                return mismatch(issues);
            };
            let Some(schema) = nested else {
                return Some(value.clone());
            };
            let before = issues.len();
            let checked = schema.validate_at(path, map, issues);
            (issues.len() == before).then(|| Value::Object(checked))
        }
        FieldKind::Any => Some(value.clone()),
        _ => mismatch(issues),
    }
}

fn measure(value: &Value) -> Option<(usize, &'static str)> {
    match value {
        Value::String(s) => Some((s.chars().count(), "characters")),
        Value::Array(a) => Some((a.len(), "items")),
        Value::Object(o) => Some((o.len(), "items")),
        _ => None,
    }
}

fn container_name(value: &Value) -> &'static str {
    match value {
        Value::String(_) => "String",
        Value::Array(_) => "List",
        _ => "Object",
    }
}

/// Prints whole bounds without a trailing `.0`.
fn fmt_bound(bound: f64) -> String {
    if bound.fract() == 0.0 && bound.abs() < 1e15 {
        format!("{}", bound as i64)
    } else {
        bound.to_string()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(field: &Field, value: Value) -> (Option<Value>, Vec<Issue>) {
        let mut issues = Vec::new();
        let out = field.check("f", &value, &mut issues);
        (out, issues)
    }

    #[test]
    fn test_integer_accepts_whole_float_and_normalizes() {
        let (out, issues) = check(&Field::integer("f"), json!(3.0));
        assert!(issues.is_empty());
        assert_eq!(out, Some(json!(3)));
        assert!(out.unwrap().is_i64());
    }

    #[test]
    fn test_integer_rejects_fractional_float() {
        let (out, issues) = check(&Field::integer("f"), json!(3.5));
        assert!(out.is_none());
        assert_eq!(issues[0].message, "Input should be a valid integer");
    }

    #[test]
    fn test_integer_rejects_numeric_string() {
        let (out, issues) = check(&Field::integer("f"), json!("42"));
        assert!(out.is_none());
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn test_float_accepts_integer() {
        let (out, _) = check(&Field::float("f"), json!(7));
        assert_eq!(out, Some(json!(7)));
    }

    #[test]
    fn test_null_rejected_unless_nullable() {
        let (out, issues) = check(&Field::string("f"), Value::Null);
        assert!(out.is_none());
        assert_eq!(issues[0].message, "Input should be a valid string");

        let (out, issues) = check(&Field::string("f").nullable(), Value::Null);
        assert_eq!(out, Some(Value::Null));
        assert!(issues.is_empty());
    }

    #[test]
    fn test_range_reports_both_bounds_in_messages() {
        let field = Field::integer("f").range(1, 1000);

        let (_, low) = check(&field, json!(0));
        let (_, high) = check(&field, json!(2000));

        assert_eq!(low[0].message, "Input should be greater than or equal to 1");
        assert_eq!(high[0].message, "Input should be less than or equal to 1000");
    }

    #[test]
    fn test_string_length_counts_characters_not_bytes() {
        let field = Field::string("f").max_length(3);
        let (out, issues) = check(&field, json!("héé"));
        assert!(issues.is_empty(), "{issues:?}");
        assert!(out.is_some());

        let (_, issues) = check(&field, json!("abcd"));
        assert_eq!(issues[0].message, "String should have at most 3 characters");
    }

    #[test]
    fn test_choices_listed_in_message() {
        let field = Field::string("f").one_of(["debug", "info"]);
        let (out, issues) = check(&field, json!("loud"));
        assert!(out.is_none());
        assert_eq!(issues[0].message, r#"Input should be one of "debug", "info""#);
    }

    #[test]
    fn test_validators_run_in_declaration_order_and_stop_at_first_failure() {
        let field = Field::integer("f")
            .validator(|v| {
                if v.as_i64() == Some(13) {
                    Err("unlucky".to_string())
                } else {
                    Ok(())
                }
            })
            .validator(|_| Err("second".to_string()));

        let (_, issues) = check(&field, json!(13));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].message, "unlucky");

        let (_, issues) = check(&field, json!(1));
        assert_eq!(issues[0].message, "second");
    }

    #[test]
    fn test_validators_skipped_when_builtin_checks_fail() {
        let field = Field::integer("f")
            .maximum(5)
            .validator(|_| Err("should not run".to_string()));

        let (_, issues) = check(&field, json!(9));
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("less than or equal"));
    }

    #[test]
    fn test_array_items_report_indexed_paths() {
        let field = Field::array("f").items(FieldKind::Integer);
        let (out, issues) = check(&field, json!([1, "two", 3, false]));
        assert!(out.is_none());
        let paths: Vec<&str> = issues.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, vec!["f[1]", "f[3]"]);
    }

    #[test]
    fn test_items_modifier_ignored_on_non_array_field() {
        let field = Field::string("f").items(FieldKind::Integer);
        assert!(matches!(field.kind(), FieldKind::String));
    }

    #[test]
    fn test_debug_output_counts_validators() {
        let field = Field::boolean("flag").validator(|_| Ok(()));
        let text = format!("{field:?}");
        assert!(text.contains("validators: 1"));
    }
}
