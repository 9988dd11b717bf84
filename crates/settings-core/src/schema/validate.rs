//! Validation of raw JSON mappings against a [`Schema`].

use serde_json::{Map, Value};
use thiserror::Error;

use super::Schema;

/// A single problem found while validating settings data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    /// Dotted location of the offending value (`server.port`, `hosts[2]`).
    /// Empty for problems with the document as a whole.
    pub path: String,
    pub message: String,
}

impl Issue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Settings data failed schema validation or could not be parsed.
///
/// All issues found in one pass are collected rather than stopping at the
/// first, so a user fixing a hand-edited file sees every problem at once.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid settings data: {}", summarize(.issues))]
pub struct ValidationError {
    issues: Vec<Issue>,
}

impl ValidationError {
    pub fn new(issues: Vec<Issue>) -> Self {
        Self { issues }
    }

    /// Error carrying exactly one issue.
    pub fn single(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(vec![Issue::new(path, message)])
    }

    /// Text that is not a JSON document.
    pub fn malformed_json(err: &serde_json::Error) -> Self {
        Self::single("", format!("Invalid JSON: {err}"))
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// First issue recorded at exactly `path`.
    pub fn issue_at(&self, path: &str) -> Option<&Issue> {
        self.issues.iter().find(|issue| issue.path == path)
    }

    pub fn into_issues(self) -> Vec<Issue> {
        self.issues
    }
}

fn summarize(issues: &[Issue]) -> String {
    let noun = if issues.len() == 1 { "error" } else { "errors" };
    let details: Vec<String> = issues
        .iter()
        .map(|issue| {
            if issue.path.is_empty() {
                issue.message.clone()
            } else {
                format!("{}: {}", issue.path, issue.message)
            }
        })
        .collect();
    format!("{} validation {noun}; {}", issues.len(), details.join("; "))
}

pub(crate) fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

impl Schema {
    /// Validates `raw` and returns the normalized mapping.
    ///
    /// Unknown keys are rejected, absent keys take their declared default,
    /// and absent required keys are reported. The returned map holds exactly
    /// the schema's fields.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] listing every issue found.
    pub fn validate(&self, raw: &Map<String, Value>) -> Result<Map<String, Value>, ValidationError> {
        let mut issues = Vec::new();
        let normalized = self.validate_at("", raw, &mut issues);
        if issues.is_empty() {
            Ok(normalized)
        } else {
            Err(ValidationError::new(issues))
        }
    }

    /// Like [`Schema::validate`], for an arbitrary JSON document whose top
    /// level must be an object.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when `raw` is not an object or fails
    /// validation.
    pub fn validate_value(&self, raw: &Value) -> Result<Map<String, Value>, ValidationError> {
        match raw.as_object() {
            Some(map) => self.validate(map),
            None => Err(ValidationError::single("", "Input should be a valid object")),
        }
    }

    pub(crate) fn validate_at(
        &self,
        prefix: &str,
        raw: &Map<String, Value>,
        issues: &mut Vec<Issue>,
    ) -> Map<String, Value> {
        for key in raw.keys() {
            if self.field(key).is_none() {
                issues.push(Issue::new(
                    join_path(prefix, key),
                    "Extra inputs are not permitted",
                ));
            }
        }

        let mut normalized = Map::new();
        for field in self.fields() {
            let path = join_path(prefix, field.name());
            match raw.get(field.name()).or(field.default_value()) {
                Some(value) => {
                    if let Some(checked) = field.check(&path, value, issues) {
                        normalized.insert(field.name().to_string(), checked);
                    }
                }
                None => issues.push(Issue::new(path, "Field required")),
            }
        }
        normalized
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
            .field(Field::string("app_name").default("My App"))
            .field(Field::integer("max_connections").default(100).range(1, 1000))
            .field(Field::string("token").required())
            .build()
            .expect("valid schema")
    }

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("object literal")
    }

    #[test]
    fn test_validate_fills_defaults_for_missing_keys() {
        // Arrange
        let raw = map(json!({ "token": "t" }));

        // Act
        let out = schema().validate(&raw).expect("valid");

        // Assert
        assert_eq!(out["app_name"], json!("My App"));
        assert_eq!(out["max_connections"], json!(100));
        assert_eq!(out["token"], json!("t"));
    }

    #[test]
    fn test_validate_reports_missing_required_field() {
        let err = schema().validate(&Map::new()).unwrap_err();
        assert_eq!(err.issue_at("token").unwrap().message, "Field required");
    }

    #[test]
    fn test_validate_rejects_extra_keys() {
        let raw = map(json!({ "token": "t", "unknown_field": 1 }));
        let err = schema().validate(&raw).unwrap_err();
        assert_eq!(
            err.issue_at("unknown_field").unwrap().message,
            "Extra inputs are not permitted"
        );
    }

    #[test]
    fn test_validate_collects_all_issues() {
        let raw = map(json!({ "app_name": 5, "max_connections": 2000 }));
        let err = schema().validate(&raw).unwrap_err();
        assert_eq!(err.issues().len(), 3);
        assert!(err.issue_at("app_name").is_some());
        assert!(err.issue_at("max_connections").is_some());
        assert!(err.issue_at("token").is_some());
    }

    #[test]
    fn test_validate_value_requires_object_top_level() {
        let err = schema().validate_value(&json!([1, 2])).unwrap_err();
        assert_eq!(err.issues()[0].path, "");
        assert_eq!(err.issues()[0].message, "Input should be a valid object");
    }

    #[test]
    fn test_display_starts_with_invalid_settings_data() {
        let err = ValidationError::single("max_connections", "too big");
        assert_eq!(
            err.to_string(),
            "Invalid settings data: 1 validation error; max_connections: too big"
        );
    }

    #[test]
    fn test_malformed_json_error_has_root_path() {
        let parse_err = serde_json::from_str::<Value>("invalid json").unwrap_err();
        let err = ValidationError::malformed_json(&parse_err);
        assert!(err.to_string().starts_with("Invalid settings data: 1 validation error; Invalid JSON:"));
    }

    #[test]
    fn test_nested_schema_reports_dotted_paths() {
        let server = Schema::builder()
            .field(Field::string("host").default("localhost"))
            .field(Field::integer("port").default(8080).range(1, 65535))
            .build()
            .unwrap();
        let outer = Schema::builder()
            .field(Field::object("server").nested(server).default(json!({})))
            .build()
            .unwrap();

        let err = outer
            .validate(&map(json!({ "server": { "port": 0, "tls": true } })))
            .unwrap_err();

        assert!(err.issue_at("server.port").is_some());
        assert!(err.issue_at("server.tls").is_some());

        let ok = outer.validate(&Map::new()).unwrap();
        assert_eq!(ok["server"], json!({ "host": "localhost", "port": 8080 }));
    }
}
