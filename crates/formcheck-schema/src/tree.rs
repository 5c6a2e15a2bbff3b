//! # Schema Tree
//!
//! A [`SchemaTree`] is a checked, immutable node graph rooted at an object
//! node: the declarative description of an entire record. It is `Send + Sync`
//! and holds no per-validation state, so one tree can serve any number of
//! concurrent validation calls.

use formcheck_core::{FieldPath, PathSegment, SchemaError};

use crate::node::{Node, ObjectNode};

/// The description of a whole record.
#[derive(Debug, Clone)]
pub struct SchemaTree {
    root: Node,
}

impl SchemaTree {
    /// Wrap a root node after checking it.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::NonObjectRoot` if `root` is not an object node
    /// and `SchemaError::InvertedBounds` if any node declares a lower bound
    /// above its upper bound.
    pub fn new(root: impl Into<Node>) -> Result<Self, SchemaError> {
        let root = root.into();
        if root.as_object().is_none() {
            return Err(SchemaError::NonObjectRoot {
                found: root.kind_name().to_string(),
            });
        }
        root.check()?;
        Ok(Self { root })
    }

    /// The root node.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// The root object node.
    pub fn root_object(&self) -> Option<&ObjectNode> {
        self.root.as_object()
    }

    /// Resolve a path to the node describing that location.
    ///
    /// Field segments descend into object fields; index segments descend into
    /// an array's element node (any index resolves, since every element
    /// shares the same node). Returns `None` if the path leaves the tree.
    pub fn node_at(&self, path: &FieldPath) -> Option<&Node> {
        path.segments()
            .iter()
            .try_fold(&self.root, |node, segment| match (node, segment) {
                (Node::Object(object), PathSegment::Field(name)) => object.field(name),
                (Node::Array(array), PathSegment::Index(_)) => Some(array.element()),
                _ => None,
            })
    }
}
