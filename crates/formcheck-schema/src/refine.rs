//! # Refinements
//!
//! Business rules that run on a field's *post-transform* value. They are
//! plain functions taking the value and an explicit policy, so they can be
//! tested without building a schema, and bound into a node with a closure
//! that owns a copy of the policy.

use serde::{Deserialize, Serialize};

/// Which email domains a form accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmailDomainPolicy {
    /// Accepted domains. An address matches a suffix if its domain equals it
    /// or is a subdomain of it. Compared case-insensitively.
    pub allowed_suffixes: Vec<String>,
    /// Message reported when no suffix matches.
    pub message: String,
}

impl Default for EmailDomainPolicy {
    fn default() -> Self {
        Self {
            allowed_suffixes: vec!["rocketseat.com.br".to_string()],
            message: "O e-mail precisa ser da Rocketseat".to_string(),
        }
    }
}

impl EmailDomainPolicy {
    /// A policy accepting exactly the given domains.
    pub fn new(
        allowed_suffixes: impl IntoIterator<Item = impl Into<String>>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            allowed_suffixes: allowed_suffixes.into_iter().map(Into::into).collect(),
            message: message.into(),
        }
    }
}

/// Check that an email address belongs to one of the policy's domains.
///
/// Returns the policy's message on failure. A value without `@` fails.
pub fn email_domain(value: &str, policy: &EmailDomainPolicy) -> Result<(), String> {
    let Some((_, domain)) = value.rsplit_once('@') else {
        return Err(policy.message.clone());
    };
    let domain = domain.to_ascii_lowercase();

    let matched = policy.allowed_suffixes.iter().any(|suffix| {
        let suffix = suffix.trim_start_matches('.').to_ascii_lowercase();
        !suffix.is_empty()
            && (domain == suffix
                || domain
                    .strip_suffix(&suffix)
                    .is_some_and(|head| head.ends_with('.')))
    });

    if matched {
        Ok(())
    } else {
        Err(policy.message.clone())
    }
}
