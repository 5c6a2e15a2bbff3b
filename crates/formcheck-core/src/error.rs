//! # Error Types — Violations and Schema Defects
//!
//! Two disjoint families live here:
//!
//! - [`Violation`] / [`ViolationKind`] describe *bad input data*. They are
//!   ordinary values collected into an [`ErrorMap`](crate::ErrorMap) and are
//!   never raised as Rust errors.
//! - [`SchemaError`] describes a *bad schema*: a construction-time authoring
//!   defect (an array node with no element, a duplicated field name). It is
//!   returned from schema builders and never appears in an error map.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification of a single validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Field empty when required.
    Required,
    /// Value present but fails a shape or pattern rule.
    Format,
    /// Numeric value outside declared bounds.
    Range,
    /// Raw value could not be converted to the field's declared type.
    Coercion,
    /// Collection length outside declared bounds.
    Cardinality,
    /// Business rule failed after transform.
    Refinement,
}

impl ViolationKind {
    /// Stable snake_case name, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Format => "format",
            Self::Range => "range",
            Self::Coercion => "coercion",
            Self::Cardinality => "cardinality",
            Self::Refinement => "refinement",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One failed rule or refinement at some location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Violation {
    /// What kind of check failed.
    pub kind: ViolationKind,
    /// Opaque, caller-supplied message for display.
    pub message: String,
}

impl Violation {
    /// Construct a violation.
    pub fn new(kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

/// A schema authoring defect detected while building a schema tree.
///
/// These indicate a bug in the schema definition, not bad input, so they
/// are fatal to the caller constructing the schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// An array node was built without an element node.
    #[error("array node has no element schema")]
    MissingElement,

    /// An object node declares the same field twice.
    #[error("duplicate field '{name}' in object node")]
    DuplicateField {
        /// The repeated field name.
        name: String,
    },

    /// An object node declares a field with an unaddressable name.
    #[error("invalid field name '{name}': {reason}")]
    InvalidFieldName {
        /// The offending field name.
        name: String,
        /// Why the name cannot be used.
        reason: String,
    },

    /// A lower bound exceeds its upper bound.
    #[error("inverted bounds: minimum {min} exceeds maximum {max}")]
    InvertedBounds {
        /// Declared minimum.
        min: String,
        /// Declared maximum.
        max: String,
    },

    /// A custom pattern rule could not be compiled.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The pattern source text.
        pattern: String,
        /// Compiler diagnostic.
        reason: String,
    },

    /// The root of a schema tree must be an object node.
    #[error("schema tree root must be an object node, found {found}")]
    NonObjectRoot {
        /// Kind of node found at the root.
        found: String,
    },
}
