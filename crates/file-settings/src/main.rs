//! settings-demo — command-line walkthrough of the file-settings lifecycle.
//!
//! Manages a sample `settings.json` holding [`DemoSettings`] in a chosen
//! directory.  Every subcommand maps onto one library operation.
//!
//! # Usage
//!
//! ```text
//! settings-demo [--dir DIR] <COMMAND>
//!
//! Commands:
//!   exists                          Print whether the settings file is present
//!   create [--force] [--set K=V]... Write a new file from defaults + overrides
//!   show [--create-if-missing]      Load, validate, and print the file
//!   set KEY VALUE                   Load, assign one field, and save
//! ```
//!
//! `VALUE` is parsed as JSON when possible (`42`, `true`, `["a","b"]`) and
//! otherwise taken as a plain string.
//!
//! # Environment variable overrides
//!
//! | Variable                  | Field             |
//! |---------------------------|-------------------|
//! | `DEMO_APP_NAME`           | `app_name`        |
//! | `DEMO_MAX_CONNECTIONS`    | `max_connections` |
//! | `DEMO_LOG_LEVEL`          | `log_level`       |
//! | `DEMO_ALLOWED_HOSTS`      | `allowed_hosts`   |
//!
//! Values in the file take precedence over the environment.  `RUST_LOG`
//! controls this program's own log output (default `info`).

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;
use tracing_subscriber::EnvFilter;

use file_settings::{Field, FieldKind, Schema, SchemaError, SettingsFile, SettingsSchema};

// ── Sample schema ─────────────────────────────────────────────────────────────

/// Settings of an imaginary network service.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DemoSettings {
    app_name: String,
    max_connections: u32,
    log_level: String,
    allowed_hosts: Vec<String>,
}

impl SettingsSchema for DemoSettings {
    fn schema() -> Result<Schema, SchemaError> {
        Schema::builder()
            .env_prefix("DEMO_")
            .field(
                Field::string("app_name")
                    .default("My App")
                    .min_length(1)
                    .description("Display name of the service"),
            )
            .field(
                Field::integer("max_connections")
                    .default(100)
                    .range(1, 1000)
                    .description("Concurrent client connections accepted"),
            )
            .field(
                Field::string("log_level")
                    .default("info")
                    .one_of(["error", "warn", "info", "debug", "trace"]),
            )
            .field(
                Field::array("allowed_hosts")
                    .default(Vec::<Value>::new())
                    .items(FieldKind::String)
                    .validator(|hosts| {
                        let blank = hosts
                            .as_array()
                            .is_some_and(|list| list.iter().any(|h| h.as_str() == Some("")));
                        if blank {
                            Err("host names must not be empty".to_string())
                        } else {
                            Ok(())
                        }
                    }),
            )
            .build()
    }
}

// ── CLI argument definitions ──────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(
    name = "settings-demo",
    about = "Create, inspect, and edit a schema-validated JSON settings file",
    version
)]
struct Cli {
    /// Directory holding settings.json.
    #[arg(long, default_value = ".", env = "SETTINGS_DEMO_DIR")]
    dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print whether the settings file exists.
    Exists,

    /// Write a new settings file from defaults, environment, and overrides.
    Create {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,

        /// Initial value for one field, as KEY=VALUE.  Repeatable.
        #[arg(long = "set", value_name = "KEY=VALUE")]
        values: Vec<String>,
    },

    /// Load, validate, and print the settings file.
    Show {
        /// Write a defaults file first if none exists.
        #[arg(long)]
        create_if_missing: bool,
    },

    /// Assign one field and save.
    Set { key: String, value: String },
}

/// Parses a command-line value as JSON, falling back to a string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn parse_assignments(pairs: &[String]) -> anyhow::Result<Map<String, Value>> {
    let mut values = Map::new();
    for pair in pairs {
        let Some((key, raw)) = pair.split_once('=') else {
            bail!("expected KEY=VALUE, got '{pair}'");
        };
        values.insert(key.trim().to_string(), parse_value(raw));
    }
    Ok(values)
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    // Level is overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let file = SettingsFile::<DemoSettings>::new().context("invalid demo schema")?;

    match cli.command {
        Command::Exists => {
            println!("{}", file.exists(&cli.dir));
        }
        Command::Create { force, values } => {
            let values = parse_assignments(&values)?;
            let settings = file
                .create(&cli.dir, Some(values), force)
                .with_context(|| format!("creating settings in {}", cli.dir.display()))?;
            info!("created {}", settings.path().display());
        }
        Command::Show { create_if_missing } => {
            let settings = file
                .load(&cli.dir, create_if_missing)
                .with_context(|| format!("loading settings from {}", cli.dir.display()))?;
            println!("{}", settings.settings().to_json_pretty()?);
        }
        Command::Set { key, value } => {
            let mut settings = file
                .load(&cli.dir, false)
                .with_context(|| format!("loading settings from {}", cli.dir.display()))?;
            settings
                .set(&key, parse_value(&value))
                .with_context(|| format!("invalid value for `{key}`"))?;
            settings.save()?;
            info!("{key} updated in {}", settings.path().display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_schema_builds() {
        let schema = DemoSettings::schema().expect("demo schema is valid");
        assert_eq!(schema.fields().len(), 4);
        assert_eq!(
            schema.env_name(&schema.fields()[1]).as_deref(),
            Some("DEMO_MAX_CONNECTIONS")
        );
    }

    #[test]
    fn test_parse_value_prefers_json() {
        assert_eq!(parse_value("42"), Value::from(42));
        assert_eq!(parse_value("true"), Value::Bool(true));
        assert_eq!(parse_value("hello"), Value::String("hello".to_string()));
    }

    #[test]
    fn test_parse_assignments_rejects_missing_equals() {
        let err = parse_assignments(&["max_connections".to_string()]).unwrap_err();
        assert!(err.to_string().contains("KEY=VALUE"));
    }

    #[test]
    fn test_parse_assignments_splits_on_first_equals() {
        let values = parse_assignments(&["app_name=a=b".to_string()]).unwrap();
        assert_eq!(values["app_name"], Value::String("a=b".to_string()));
    }

    #[test]
    fn test_blank_host_rejected_by_custom_validator() {
        let schema = DemoSettings::schema().unwrap();
        let raw = serde_json::json!({ "allowed_hosts": ["example.com", ""] });
        let err = schema.validate_value(&raw).unwrap_err();
        assert_eq!(
            err.issue_at("allowed_hosts").unwrap().message,
            "host names must not be empty"
        );
    }

    #[test]
    fn test_cli_parses_create_with_overrides() {
        let cli = Cli::parse_from([
            "settings-demo",
            "--dir",
            "/tmp/cfg",
            "create",
            "--force",
            "--set",
            "max_connections=5",
        ]);
        match cli.command {
            Command::Create { force, values } => {
                assert!(force);
                assert_eq!(values, vec!["max_connections=5".to_string()]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
