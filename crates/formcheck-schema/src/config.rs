//! # Validator Configuration
//!
//! [`ValidatorConfig`] carries the knobs a host may tune without touching a
//! schema definition: how many messages to report per field and which email
//! domains the built-in signup form accepts. It is loaded from YAML; every
//! field has a default, so an empty document is a valid configuration.
//!
//! ```yaml
//! report_mode: all_per_field
//! email_domain:
//!   allowed_suffixes: [rocketseat.com.br, rocketseat.team]
//!   message: O e-mail precisa ser da Rocketseat
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::refine::EmailDomainPolicy;

/// How many messages a failing field contributes to the error map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportMode {
    /// Only the first failing rule's message, in declared order.
    #[default]
    FirstPerField,
    /// Every failing rule's message, in declared order.
    AllPerField,
}

/// Error loading a [`ValidatorConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read config '{path}': {source}")]
    Read {
        /// Path that failed to load.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid YAML for this structure.
    #[error("invalid config YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The document parsed but describes an unusable configuration.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Validator and built-in form settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorConfig {
    /// Messages reported per failing field.
    pub report_mode: ReportMode,
    /// Domain policy for the signup form's email refinement.
    pub email_domain: EmailDomainPolicy,
}

impl ValidatorConfig {
    /// Parse and check a YAML configuration document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed YAML or unknown keys and
    /// `ConfigError::Invalid` if the result fails [`ValidatorConfig::check`].
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.check()?;
        Ok(config)
    }

    /// Load a YAML configuration file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Read` if the file cannot be read, otherwise as
    /// [`ValidatorConfig::from_yaml_str`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_yaml_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            report_mode = ?config.report_mode,
            "loaded validator config"
        );
        Ok(config)
    }

    /// Reject configurations that would make every email fail refinement.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if no domain suffix is configured or a
    /// configured suffix is blank.
    pub fn check(&self) -> Result<(), ConfigError> {
        let suffixes = &self.email_domain.allowed_suffixes;
        if suffixes.is_empty() {
            return Err(ConfigError::Invalid(
                "email_domain.allowed_suffixes must not be empty".to_string(),
            ));
        }
        if suffixes.iter().any(|s| s.trim_matches(['.', ' ']).is_empty()) {
            return Err(ConfigError::Invalid(
                "email_domain.allowed_suffixes must not contain blank entries".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config = ValidatorConfig::from_yaml_str("").unwrap();
        assert_eq!(config, ValidatorConfig::default());
        assert_eq!(config.report_mode, ReportMode::FirstPerField);
    }

    #[test]
    fn test_full_document() {
        let config = ValidatorConfig::from_yaml_str(
            r#"
report_mode: all_per_field
email_domain:
  allowed_suffixes: [rocketseat.com.br, rocketseat.team]
  message: wrong domain
"#,
        )
        .unwrap();
        assert_eq!(config.report_mode, ReportMode::AllPerField);
        assert_eq!(config.email_domain.allowed_suffixes.len(), 2);
        assert_eq!(config.email_domain.message, "wrong domain");
    }

    #[test]
    fn test_partial_policy_keeps_default_message() {
        let config = ValidatorConfig::from_yaml_str(
            "email_domain:\n  allowed_suffixes: [example.org]\n",
        )
        .unwrap();
        assert_eq!(
            config.email_domain.message,
            EmailDomainPolicy::default().message
        );
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = ValidatorConfig::from_yaml_str("report_mod: all_per_field\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_empty_suffix_list_rejected() {
        let err =
            ValidatorConfig::from_yaml_str("email_domain:\n  allowed_suffixes: []\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = ValidatorConfig::from_path("/nonexistent/formcheck.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
