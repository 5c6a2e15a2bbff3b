//! # formcheck-cli — Command-Line Harness
//!
//! Stands in for a form's submission handler: reads a raw record from disk,
//! validates it against the built-in signup form and prints either the
//! normalized record or the message for every failing field.
//!
//! ## Subcommands
//!
//! - `formcheck validate <PATH>`: validate a JSON or YAML record.
//! - `formcheck schema`: list every path of the signup form with its rules.
//!
//! ```bash
//! formcheck validate signup.json
//! formcheck validate signup.yaml --all-messages --format json
//! formcheck --config formcheck.yaml validate signup.json
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from validation logic, which lives in
//!   `formcheck-schema`.
//! - Exit codes: 0 valid, 1 invalid record, 2 operational error.

pub mod schema;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use formcheck_schema::ValidatorConfig;

/// Load the validator configuration, falling back to defaults when no file
/// is given.
pub fn load_config(path: Option<&Path>) -> Result<ValidatorConfig> {
    match path {
        Some(path) => ValidatorConfig::from_path(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(ValidatorConfig::default()),
    }
}
