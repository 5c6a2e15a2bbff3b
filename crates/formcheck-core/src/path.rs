//! # Field Paths — Path Resolver Grammar
//!
//! A [`FieldPath`] locates a value inside a structured record as a sequence
//! of [`PathSegment`]s: object field names and zero-based array indices.
//! The same path addresses a slot in the schema tree, a value in the raw
//! record, and an entry in the [`ErrorMap`](crate::ErrorMap).
//!
//! ## Grammar
//!
//! - Segments are separated by `.`: `techs.2.title`.
//! - An all-digit segment is an array index.
//! - Bracketed indices are accepted as an alternative spelling:
//!   `techs[2].title` parses to the same path as `techs.2.title`.
//! - The empty string is the root path.
//!
//! The canonical display form is always dotted, so `parse(display(p)) == p`.
//! Field names consisting only of digits cannot be addressed; schemas must
//! not declare them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathSegment {
    /// A named field of an object.
    Field(String),
    /// A zero-based position within an array.
    Index(usize),
}

impl PathSegment {
    /// Returns the field name if this segment names an object field.
    pub fn as_field(&self) -> Option<&str> {
        match self {
            Self::Field(name) => Some(name),
            Self::Index(_) => None,
        }
    }

    /// Returns the index if this segment addresses an array element.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Field(_) => None,
            Self::Index(index) => Some(*index),
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => f.write_str(name),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(name: &str) -> Self {
        Self::Field(name.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// Error returned when a textual path does not follow the path grammar.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathParseError {
    /// Two separators in a row, or a leading/trailing separator.
    #[error("empty segment in path '{path}'")]
    EmptySegment {
        /// The path that failed to parse.
        path: String,
    },

    /// A `[` without its matching `]`.
    #[error("unclosed bracket in path '{path}'")]
    UnclosedBracket {
        /// The path that failed to parse.
        path: String,
    },

    /// A bracketed or all-digit segment that is not a valid index.
    #[error("invalid index '{index}' in path '{path}'")]
    InvalidIndex {
        /// The path that failed to parse.
        path: String,
        /// The offending index text.
        index: String,
    },

    /// Text following a closing bracket that is neither `.` nor `[`.
    #[error("unexpected text after index in path '{path}'")]
    TrailingText {
        /// The path that failed to parse.
        path: String,
    },
}

/// A location within a record: a sequence of field names and indices.
///
/// Paths are cheap to extend ([`FieldPath::field`], [`FieldPath::index`])
/// and totally ordered, so error maps keyed by them iterate deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    /// The empty path, addressing the record itself.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Build a path from explicit segments.
    pub fn from_segments(segments: impl IntoIterator<Item = PathSegment>) -> Self {
        Self(segments.into_iter().collect())
    }

    /// Returns a new path extended by a field name.
    pub fn field(&self, name: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Field(name.to_string()));
        Self(segments)
    }

    /// Returns a new path extended by an array index.
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }

    /// Returns a new path with `suffix` appended.
    pub fn join(&self, suffix: &FieldPath) -> Self {
        let mut segments = self.0.clone();
        segments.extend(suffix.0.iter().cloned());
        Self(segments)
    }

    /// Access the segments of this path.
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Returns true for the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true for the root path.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The final segment, if any.
    pub fn last(&self) -> Option<&PathSegment> {
        self.0.last()
    }

    /// Returns true if `prefix` is a (non-strict) prefix of this path.
    pub fn starts_with(&self, prefix: &FieldPath) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Returns true if this path addresses an array element, i.e. its
    /// final segment is an index.
    pub fn ends_with_index(&self) -> bool {
        matches!(self.0.last(), Some(PathSegment::Index(_)))
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for FieldPath {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::root());
        }

        let mut segments = Vec::new();
        for part in s.split('.') {
            let (head, mut rest) = match part.find('[') {
                Some(pos) => part.split_at(pos),
                None => (part, ""),
            };

            if head.is_empty() && rest.is_empty() {
                return Err(PathParseError::EmptySegment {
                    path: s.to_string(),
                });
            }

            if !head.is_empty() {
                if head.bytes().all(|b| b.is_ascii_digit()) {
                    segments.push(PathSegment::Index(parse_index(s, head)?));
                } else {
                    segments.push(PathSegment::Field(head.to_string()));
                }
            }

            while !rest.is_empty() {
                let close = rest.find(']').ok_or_else(|| PathParseError::UnclosedBracket {
                    path: s.to_string(),
                })?;
                segments.push(PathSegment::Index(parse_index(s, &rest[1..close])?));
                rest = &rest[close + 1..];
                if !rest.is_empty() && !rest.starts_with('[') {
                    return Err(PathParseError::TrailingText {
                        path: s.to_string(),
                    });
                }
            }
        }

        Ok(Self(segments))
    }
}

fn parse_index(path: &str, text: &str) -> Result<usize, PathParseError> {
    let invalid = || PathParseError::InvalidIndex {
        path: path.to_string(),
        index: text.to_string(),
    };
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    text.parse::<usize>().map_err(|_| invalid())
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
