//! # Validate Subcommand
//!
//! Reads one record (JSON, or YAML by `.yaml`/`.yml` extension), validates it
//! against the signup form and prints the outcome.
//!
//! On success the normalized record is printed as pretty JSON. On failure
//! each failing path is printed with its message(s), or the whole error map
//! as a JSON object with `--format json`.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use formcheck_core::{ErrorMap, FieldPath};
use formcheck_schema::{forms, ReportMode, ValidationResult, Validator, ValidatorConfig};
use serde_json::Value;

/// Output format for validation failures.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// One `path: message` line per failure.
    #[default]
    Text,
    /// The error map as a JSON object.
    Json,
}

/// Arguments for the `formcheck validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Record to validate (JSON, or YAML with a .yaml/.yml extension).
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Report every failing rule per field instead of only the first.
    #[arg(long)]
    pub all_messages: bool,

    /// Output format for failures.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Print only the message for this path (e.g. `techs.0.title`).
    #[arg(long, value_name = "FIELD_PATH")]
    pub field: Option<String>,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 on success, 1 on validation failure. Operational
/// errors (unreadable file, malformed record) are returned as `Err`.
pub fn run_validate(args: &ValidateArgs, config: &ValidatorConfig) -> Result<u8> {
    let record = load_record(&args.path)?;
    let tree = forms::signup_schema(&config.email_domain).context("signup schema is malformed")?;

    let mut validator = Validator::from_config(config);
    if args.all_messages {
        validator = Validator::new(ReportMode::AllPerField);
    }

    let result = validator.validate(&tree, &record);
    tracing::info!(
        path = %args.path.display(),
        valid = result.is_success(),
        "validated record"
    );

    if let Some(field) = &args.field {
        let field: FieldPath = field
            .parse()
            .with_context(|| format!("invalid field path '{field}'"))?;
        if let Some(message) = result
            .errors()
            .and_then(|errors| formcheck_core::resolve_error_at_path(errors, &field))
        {
            println!("{message}");
        }
        return Ok(u8::from(!result.is_success()));
    }

    print!("{}", render(&result, args.format)?);
    Ok(u8::from(!result.is_success()))
}

/// Load a record from a JSON or YAML file.
pub fn load_record(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read record {}", path.display()))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let value = match ext {
        "yaml" | "yml" => serde_yaml::from_str(&content)
            .with_context(|| format!("invalid YAML in {}", path.display()))?,
        _ => serde_json::from_str(&content)
            .with_context(|| format!("invalid JSON in {}", path.display()))?,
    };
    Ok(value)
}

/// Render a validation outcome for the terminal.
pub fn render(result: &ValidationResult, format: OutputFormat) -> Result<String> {
    match result {
        ValidationResult::Success(value) => Ok(format!("{}\n", serde_json::to_string_pretty(value)?)),
        ValidationResult::Failure(errors) => match format {
            OutputFormat::Text => Ok(render_text(errors)),
            OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(errors)?)),
        },
    }
}

fn render_text(errors: &ErrorMap) -> String {
    let mut out = String::new();
    for (path, violations) in errors.iter() {
        let label = if path.is_root() {
            "(root)".to_string()
        } else {
            path.to_string()
        };
        for v in violations {
            let _ = writeln!(out, "{label}: {}", v.message);
        }
    }
    out
}
