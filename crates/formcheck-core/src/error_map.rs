//! # Error Map
//!
//! A path-indexed collection of [`Violation`]s mirroring the shape of the
//! schema tree that produced them.
//!
//! ## Invariants
//!
//! - A path is present iff at least one violation was recorded at it. Empty
//!   entries are never stored.
//! - Array-level and element-level failures are distinguished by path shape:
//!   `techs` (cardinality) versus `techs.0.title` (an element's field).
//! - Iteration order is the total order of [`FieldPath`], so two maps built
//!   from the same failures render identically.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::error::Violation;
use crate::path::FieldPath;

/// Validation failures keyed by the path at which they occurred.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorMap {
    entries: BTreeMap<FieldPath, Vec<Violation>>,
}

impl ErrorMap {
    /// Create an empty error map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation at `path`, after any already recorded there.
    pub fn record(&mut self, path: FieldPath, violation: Violation) {
        self.entries.entry(path).or_default().push(violation);
    }

    /// Record several violations at one path. Recording none is a no-op.
    pub fn record_all(&mut self, path: FieldPath, violations: impl IntoIterator<Item = Violation>) {
        let mut violations = violations.into_iter().peekable();
        if violations.peek().is_none() {
            return;
        }
        self.entries.entry(path).or_default().extend(violations);
    }

    /// Move every entry of `other` into this map.
    pub fn merge(&mut self, other: ErrorMap) {
        for (path, violations) in other.entries {
            self.record_all(path, violations);
        }
    }

    /// Violations recorded exactly at `path`.
    pub fn get(&self, path: &FieldPath) -> Option<&[Violation]> {
        self.entries.get(path).map(Vec::as_slice)
    }

    /// The first message recorded at `path`.
    pub fn first_message(&self, path: &FieldPath) -> Option<&str> {
        self.get(path)
            .and_then(|violations| violations.first())
            .map(|v| v.message.as_str())
    }

    /// Returns true if any violation was recorded exactly at `path`.
    pub fn contains(&self, path: &FieldPath) -> bool {
        self.entries.contains_key(path)
    }

    /// Number of distinct failing paths.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no failures were recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of violations across all paths.
    pub fn violation_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Iterate `(path, violations)` pairs in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&FieldPath, &[Violation])> {
        self.entries.iter().map(|(p, v)| (p, v.as_slice()))
    }

    /// Iterate failing paths in order.
    pub fn paths(&self) -> impl Iterator<Item = &FieldPath> {
        self.entries.keys()
    }

    /// Iterate entries at `prefix` or anywhere beneath it.
    pub fn under<'a>(
        &'a self,
        prefix: &'a FieldPath,
    ) -> impl Iterator<Item = (&'a FieldPath, &'a [Violation])> + 'a {
        self.iter().filter(move |(path, _)| path.starts_with(prefix))
    }

    /// Consume the map, yielding its entries.
    pub fn into_inner(self) -> BTreeMap<FieldPath, Vec<Violation>> {
        self.entries
    }
}

/// Look up the message to render next to the field at `path`.
///
/// Returns the first recorded message at exactly that path; failures at
/// child or parent paths are not reported here.
pub fn resolve_error_at_path<'a>(errors: &'a ErrorMap, path: &FieldPath) -> Option<&'a str> {
    errors.first_message(path)
}

impl fmt::Display for ErrorMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (path, violations) in &self.entries {
            for v in violations {
                if !first {
                    writeln!(f)?;
                }
                first = false;
                if path.is_root() {
                    write!(f, "  (root): {}", v.message)?;
                } else {
                    write!(f, "  {}: {}", path, v.message)?;
                }
            }
        }
        Ok(())
    }
}

/// Serializes as an object from dotted path to the list of messages.
impl Serialize for ErrorMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (path, violations) in &self.entries {
            let messages: Vec<&str> = violations.iter().map(|v| v.message.as_str()).collect();
            map.serialize_entry(&path.to_string(), &messages)?;
        }
        map.end()
    }
}
