//! # Schema Subcommand
//!
//! Lists every addressable path of the signup form with its node kind and
//! rule tags, using the same path grammar the error map reports in.
//! Array elements are shown with index `0`.

use anyhow::{Context, Result};
use clap::Args;
use formcheck_core::FieldPath;
use formcheck_schema::{forms, Node, ValidatorConfig};

/// Arguments for the `formcheck schema` subcommand.
#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Only describe the node at this path.
    #[arg(value_name = "FIELD_PATH")]
    pub path: Option<String>,
}

/// Execute the schema subcommand.
pub fn run_schema(args: &SchemaArgs, config: &ValidatorConfig) -> Result<u8> {
    let tree = forms::signup_schema(&config.email_domain).context("signup schema is malformed")?;

    let start: FieldPath = match &args.path {
        Some(path) => path
            .parse()
            .with_context(|| format!("invalid field path '{path}'"))?,
        None => FieldPath::root(),
    };

    let Some(node) = tree.node_at(&start) else {
        println!("no such path: {start}");
        return Ok(1);
    };

    let mut lines = Vec::new();
    describe(node, &start, &mut lines);
    for line in lines {
        println!("{line}");
    }
    Ok(0)
}

/// One line per node: `path  kind  [rule tags]`, depth-first in declaration order.
pub fn describe(node: &Node, path: &FieldPath, out: &mut Vec<String>) {
    let label = if path.is_root() {
        "(root)".to_string()
    } else {
        path.to_string()
    };
    let tags: Vec<&str> = match node {
        Node::String(n) => n.rules().iter().map(|r| r.tag()).collect(),
        Node::Number(n) => n.rules().iter().map(|r| r.tag()).collect(),
        Node::Array(n) => n.rules().iter().map(|r| r.tag()).collect(),
        Node::Object(_) => Vec::new(),
    };
    let coerced = matches!(node, Node::Number(n) if n.coerces());

    let mut line = format!("{label}  {}", node.kind_name());
    if coerced {
        line.push_str(" (coerced)");
    }
    if !tags.is_empty() {
        line.push_str(&format!("  [{}]", tags.join(", ")));
    }
    out.push(line);

    match node {
        Node::Object(object) => {
            for (name, child) in object.fields() {
                describe(child, &path.field(name), out);
            }
        }
        Node::Array(array) => describe(array.element(), &path.index(0), out),
        Node::String(_) | Node::Number(_) => {}
    }
}
