//! # Schema Nodes
//!
//! A [`Node`] is a typed slot in a record description: a string, a number,
//! an object of named child nodes, or an array whose elements all share one
//! child node. Nodes are plain data built by composition; every child is
//! owned by exactly one parent, so a tree is finite, acyclic and can be
//! cloned freely.
//!
//! ## Construction
//!
//! Leaf nodes are assembled with chained methods and cannot be malformed.
//! Composite nodes go through a builder whose `build()` returns
//! `Result<_, SchemaError>`, rejecting authoring defects (an array without
//! an element, a duplicated field) at definition time:
//!
//! ```
//! use formcheck_schema::{ArrayNode, ArrayRule, NumberNode, NumberRule, ObjectNode, StringNode, StringRule};
//!
//! let tech = ObjectNode::builder()
//!     .field("title", StringNode::new().rule(StringRule::required("title is required")))
//!     .field(
//!         "knowledge",
//!         NumberNode::new().coerce(true).rule(NumberRule::min(1.0, "at least 1")),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let techs = ArrayNode::builder()
//!     .element(tech)
//!     .rule(ArrayRule::min_items(2, "at least two"))
//!     .build()
//!     .unwrap();
//! # let _ = techs;
//! ```

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use formcheck_core::{FieldPath, SchemaError};
use serde_json::{Map, Value};

use crate::rule::{check_limits, ArrayRule, NumberRule, StringRule};

const DEFAULT_STRING_TYPE_MESSAGE: &str = "Expected a string";
const DEFAULT_NUMBER_TYPE_MESSAGE: &str = "Expected a number";
const DEFAULT_OBJECT_TYPE_MESSAGE: &str = "Expected an object";
const DEFAULT_ARRAY_TYPE_MESSAGE: &str = "Expected a list";

type Transform = Arc<dyn Fn(&str) -> String + Send + Sync>;
type Refinement = Arc<dyn Fn(&str) -> Result<(), String> + Send + Sync>;
type ObjectRefinement = Arc<dyn Fn(&Map<String, Value>) -> Result<(), Issue> + Send + Sync>;

/// A failure reported by an object-level refinement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    /// Location relative to the refined object. The root path reports at
    /// the object itself.
    pub path: FieldPath,
    /// Message to record.
    pub message: String,
}

impl Issue {
    /// An issue reported at the object itself.
    pub fn here(message: impl Into<String>) -> Self {
        Self {
            path: FieldPath::root(),
            message: message.into(),
        }
    }

    /// An issue reported at one of the object's fields.
    pub fn at_field(field: &str, message: impl Into<String>) -> Self {
        Self {
            path: FieldPath::root().field(field),
            message: message.into(),
        }
    }
}

/// A composable schema description.
#[derive(Debug, Clone)]
pub enum Node {
    /// A text slot.
    String(StringNode),
    /// A numeric slot, optionally coerced from text.
    Number(NumberNode),
    /// A record of named slots.
    Object(ObjectNode),
    /// A variable-length sequence of same-shaped slots.
    Array(ArrayNode),
}

impl Node {
    /// Short name of the variant, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::Object(_) => "object",
            Self::Array(_) => "array",
        }
    }

    /// Returns the object node if this is one.
    pub fn as_object(&self) -> Option<&ObjectNode> {
        match self {
            Self::Object(node) => Some(node),
            _ => None,
        }
    }

    /// Returns the array node if this is one.
    pub fn as_array(&self) -> Option<&ArrayNode> {
        match self {
            Self::Array(node) => Some(node),
            _ => None,
        }
    }

    /// Recursively reject contradictory rule bounds.
    pub(crate) fn check(&self) -> Result<(), SchemaError> {
        match self {
            Self::String(node) => check_limits(&node.rules),
            Self::Number(node) => check_limits(&node.rules),
            Self::Object(node) => node.fields.iter().try_for_each(|(_, child)| child.check()),
            Self::Array(node) => {
                check_limits(&node.rules)?;
                node.element.check()
            }
        }
    }
}

impl From<StringNode> for Node {
    fn from(node: StringNode) -> Self {
        Self::String(node)
    }
}

impl From<NumberNode> for Node {
    fn from(node: NumberNode) -> Self {
        Self::Number(node)
    }
}

impl From<ObjectNode> for Node {
    fn from(node: ObjectNode) -> Self {
        Self::Object(node)
    }
}

impl From<ArrayNode> for Node {
    fn from(node: ArrayNode) -> Self {
        Self::Array(node)
    }
}

// ---------------------------------------------------------------------------
// String
// ---------------------------------------------------------------------------

/// A text slot: rules, then an optional transform, then an optional refinement.
#[derive(Clone, Default)]
pub struct StringNode {
    rules: Vec<StringRule>,
    transform: Option<Transform>,
    refine: Option<Refinement>,
    type_message: Option<String>,
}

impl StringNode {
    /// An unconstrained string node.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule. Rules run in the order they are added.
    pub fn rule(mut self, rule: StringRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Normalize the value once every rule has passed.
    pub fn transform(mut self, f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.transform = Some(Arc::new(f));
        self
    }

    /// Run a business rule on the transformed value.
    pub fn refine(mut self, f: impl Fn(&str) -> Result<(), String> + Send + Sync + 'static) -> Self {
        self.refine = Some(Arc::new(f));
        self
    }

    /// Message reported when the raw value is not a string.
    pub fn type_message(mut self, message: impl Into<String>) -> Self {
        self.type_message = Some(message.into());
        self
    }

    /// The declared rules, in evaluation order.
    pub fn rules(&self) -> &[StringRule] {
        &self.rules
    }

    pub(crate) fn apply_transform(&self, value: &str) -> String {
        match &self.transform {
            Some(f) => f(value),
            None => value.to_string(),
        }
    }

    pub(crate) fn apply_refine(&self, value: &str) -> Result<(), String> {
        match &self.refine {
            Some(f) => f(value),
            None => Ok(()),
        }
    }

    pub(crate) fn type_mismatch_message(&self) -> &str {
        self.type_message
            .as_deref()
            .unwrap_or(DEFAULT_STRING_TYPE_MESSAGE)
    }
}

impl fmt::Debug for StringNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringNode")
            .field("rules", &self.rules)
            .field("transform", &self.transform.is_some())
            .field("refine", &self.refine.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Number
// ---------------------------------------------------------------------------

/// A numeric slot.
#[derive(Debug, Clone, Default)]
pub struct NumberNode {
    rules: Vec<NumberRule>,
    coerce: bool,
    coercion_message: Option<String>,
}

impl NumberNode {
    /// A number node that accepts only JSON numbers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule.
    pub fn rule(mut self, rule: NumberRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Parse string input as a number before rules run.
    pub fn coerce(mut self, coerce: bool) -> Self {
        self.coerce = coerce;
        self
    }

    /// Message reported when the raw value cannot be turned into a number.
    pub fn coercion_message(mut self, message: impl Into<String>) -> Self {
        self.coercion_message = Some(message.into());
        self
    }

    /// The declared rules, in evaluation order.
    pub fn rules(&self) -> &[NumberRule] {
        &self.rules
    }

    /// Whether string input is coerced.
    pub fn coerces(&self) -> bool {
        self.coerce
    }

    pub(crate) fn coercion_failure_message(&self) -> &str {
        self.coercion_message
            .as_deref()
            .unwrap_or(DEFAULT_NUMBER_TYPE_MESSAGE)
    }
}

// ---------------------------------------------------------------------------
// Object
// ---------------------------------------------------------------------------

/// A record of named child nodes, kept in declaration order.
#[derive(Clone)]
pub struct ObjectNode {
    fields: Vec<(String, Node)>,
    refine: Option<ObjectRefinement>,
    type_message: Option<String>,
}

impl ObjectNode {
    /// Start building an object node.
    pub fn builder() -> ObjectNodeBuilder {
        ObjectNodeBuilder::default()
    }

    /// Declared fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.fields.iter().map(|(name, node)| (name.as_str(), node))
    }

    /// Declared field names in declaration order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Look up a field's node by name.
    pub fn field(&self, name: &str) -> Option<&Node> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, node)| node)
    }

    pub(crate) fn apply_refine(&self, value: &Map<String, Value>) -> Result<(), Issue> {
        match &self.refine {
            Some(f) => f(value),
            None => Ok(()),
        }
    }

    pub(crate) fn type_mismatch_message(&self) -> &str {
        self.type_message
            .as_deref()
            .unwrap_or(DEFAULT_OBJECT_TYPE_MESSAGE)
    }
}

impl fmt::Debug for ObjectNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectNode")
            .field("fields", &self.fields)
            .field("refine", &self.refine.is_some())
            .finish()
    }
}

/// Builder for [`ObjectNode`].
#[derive(Default)]
pub struct ObjectNodeBuilder {
    fields: Vec<(String, Node)>,
    refine: Option<ObjectRefinement>,
    type_message: Option<String>,
}

impl ObjectNodeBuilder {
    /// Declare a field. Declaration order is validation and output order.
    pub fn field(mut self, name: impl Into<String>, node: impl Into<Node>) -> Self {
        self.fields.push((name.into(), node.into()));
        self
    }

    /// Cross-field rule over the normalized object, run only when every
    /// field has passed.
    pub fn refine(
        mut self,
        f: impl Fn(&Map<String, Value>) -> Result<(), Issue> + Send + Sync + 'static,
    ) -> Self {
        self.refine = Some(Arc::new(f));
        self
    }

    /// Message reported when the raw value is not an object.
    pub fn type_message(mut self, message: impl Into<String>) -> Self {
        self.type_message = Some(message.into());
        self
    }

    /// Finish the node.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::DuplicateField` if a name is declared twice and
    /// `SchemaError::InvalidFieldName` if a name cannot be addressed by a
    /// field path (empty, all digits, or containing `.`, `[` or `]`).
    pub fn build(self) -> Result<ObjectNode, SchemaError> {
        let mut seen = HashSet::new();
        for (name, _) in &self.fields {
            validate_field_name(name)?;
            if !seen.insert(name.as_str()) {
                return Err(SchemaError::DuplicateField { name: name.clone() });
            }
        }
        Ok(ObjectNode {
            fields: self.fields,
            refine: self.refine,
            type_message: self.type_message,
        })
    }
}

fn validate_field_name(name: &str) -> Result<(), SchemaError> {
    let reason = if name.is_empty() {
        Some("field names must not be empty")
    } else if name.bytes().all(|b| b.is_ascii_digit()) {
        Some("all-digit names are reserved for array indices")
    } else if name.contains(['.', '[', ']']) {
        Some("'.', '[' and ']' are path separators")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(SchemaError::InvalidFieldName {
            name: name.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Array
// ---------------------------------------------------------------------------

/// A variable-length sequence validated element-by-element against one node,
/// plus rules over the sequence as a whole.
#[derive(Debug, Clone)]
pub struct ArrayNode {
    element: Box<Node>,
    rules: Vec<ArrayRule>,
    type_message: Option<String>,
}

impl ArrayNode {
    /// Start building an array node.
    pub fn builder() -> ArrayNodeBuilder {
        ArrayNodeBuilder::default()
    }

    /// The node every element is validated against.
    pub fn element(&self) -> &Node {
        &self.element
    }

    /// Collection-level rules.
    pub fn rules(&self) -> &[ArrayRule] {
        &self.rules
    }

    pub(crate) fn type_mismatch_message(&self) -> &str {
        self.type_message
            .as_deref()
            .unwrap_or(DEFAULT_ARRAY_TYPE_MESSAGE)
    }
}

/// Builder for [`ArrayNode`].
#[derive(Default)]
pub struct ArrayNodeBuilder {
    element: Option<Node>,
    rules: Vec<ArrayRule>,
    type_message: Option<String>,
}

impl ArrayNodeBuilder {
    /// Set the element node.
    pub fn element(mut self, node: impl Into<Node>) -> Self {
        self.element = Some(node.into());
        self
    }

    /// Append a collection-level rule.
    pub fn rule(mut self, rule: ArrayRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Message reported when the raw value is not an array.
    pub fn type_message(mut self, message: impl Into<String>) -> Self {
        self.type_message = Some(message.into());
        self
    }

    /// Finish the node.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::MissingElement` if no element node was set.
    pub fn build(self) -> Result<ArrayNode, SchemaError> {
        let element = self.element.ok_or(SchemaError::MissingElement)?;
        Ok(ArrayNode {
            element: Box::new(element),
            rules: self.rules,
            type_message: self.type_message,
        })
    }
}
