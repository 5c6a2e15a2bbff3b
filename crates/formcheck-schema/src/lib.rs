//! # formcheck-schema — Declarative Record Validation
//!
//! Describes the shape and constraints of structured data as a tree of
//! typed nodes, then validates raw JSON records against it, yielding either
//! a fully normalized record or a path-indexed map of field errors.
//!
//! ## Model (`rule`, `node`, `tree`)
//!
//! - [`Rule`]: one pure predicate plus its failure message.
//! - [`Node`]: a string, number, object or array slot carrying rules and,
//!   for strings, a transform and a refinement.
//! - [`SchemaTree`]: a checked node graph rooted at an object node.
//!
//! ## Validation (`validate`)
//!
//! [`validate`] / [`Validator::validate`] walk the tree once and return a
//! [`ValidationResult`]. [`Validator::parse`] additionally deserializes the
//! normalized record into an explicitly authored result type.
//! [`resolve_error_at_path`] looks up the message to show next to a field.
//!
//! ```
//! use formcheck_schema::{forms, resolve_error_at_path, validate, EmailDomainPolicy};
//! use serde_json::json;
//!
//! let tree = forms::signup_schema(&EmailDomainPolicy::default()).unwrap();
//! let result = validate(&tree, &json!({
//!     "name": " ana  paula ",
//!     "email": "ANA@ROCKETSEAT.COM.BR",
//!     "password": "secret",
//!     "techs": [{"title": "Rust", "knowledge": "90"}],
//! }));
//!
//! let errors = result.errors().unwrap();
//! assert_eq!(
//!     resolve_error_at_path(errors, &"techs".parse().unwrap()),
//!     Some("Pelo menos 2 tecnologias devem ser informadas"),
//! );
//! ```
//!
//! ## Crate Policy
//!
//! - Depends only on `formcheck-core` internally.
//! - Schema trees are immutable once built and shared freely across threads.
//! - Bad input is never a Rust error; only malformed schemas and
//!   configuration are.

pub mod config;
pub mod forms;
pub mod node;
pub mod refine;
pub mod rule;
pub mod transform;
pub mod tree;
pub mod validate;

pub use config::{ConfigError, ReportMode, ValidatorConfig};
pub use formcheck_core::{
    resolve_error_at_path, ErrorMap, FieldPath, PathSegment, SchemaError, Violation,
    ViolationKind,
};
pub use node::{
    ArrayNode, ArrayNodeBuilder, Issue, Node, NumberNode, ObjectNode, ObjectNodeBuilder,
    StringNode,
};
pub use refine::EmailDomainPolicy;
pub use rule::{ArrayRule, Limit, NumberRule, Rule, StringRule};
pub use tree::SchemaTree;
pub use validate::{validate, ParseError, ValidationResult, Validator};
