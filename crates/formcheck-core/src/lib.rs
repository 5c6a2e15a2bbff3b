//! # formcheck-core — Foundational Types for formcheck
//!
//! This crate defines the vocabulary shared by the schema engine and its
//! callers: how a location in a record is named, how a validation failure is
//! classified, and how failures are collected.
//!
//! ## Key Design Principles
//!
//! 1. **One path grammar.** [`FieldPath`] addresses the schema tree, the raw
//!    record and the [`ErrorMap`] with the same segments (field names and
//!    zero-based indices).
//!
//! 2. **Failures are data.** Bad input produces [`Violation`]s in an
//!    [`ErrorMap`]; nothing about bad input is ever raised as a Rust error.
//!
//! 3. **Schema bugs are errors.** [`SchemaError`] is reserved for authoring
//!    defects detected while a schema is built.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `formcheck-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod error_map;
pub mod path;

// Re-export primary types for ergonomic imports.
pub use error::{SchemaError, Violation, ViolationKind};
pub use error_map::{resolve_error_at_path, ErrorMap};
pub use path::{FieldPath, PathParseError, PathSegment};
