//! # Built-in Forms
//!
//! The signup form: a user's name, email, password and a list of
//! technologies with a self-assessed knowledge level.
//!
//! | Path | Constraints | Normalization |
//! |------|-------------|---------------|
//! | `name` | required | each word capitalized |
//! | `email` | required, email syntax, allowed domain | lower-cased |
//! | `password` | at least 6 characters | none |
//! | `techs` | at least 2 entries | none |
//! | `techs.N.title` | required | trimmed |
//! | `techs.N.knowledge` | required, integer, 1..=100 (text coerced) | number |
//!
//! The schema and [`SignupForm`] are authored separately; a unit test keeps
//! their field sets identical.

use formcheck_core::SchemaError;
use serde::{Deserialize, Serialize};

use crate::node::{ArrayNode, NumberNode, ObjectNode, StringNode};
use crate::refine::{email_domain, EmailDomainPolicy};
use crate::rule::{ArrayRule, NumberRule, StringRule};
use crate::transform;
use crate::tree::SchemaTree;

/// Minimum number of technologies a signup must list.
pub const MIN_TECHS: usize = 2;

/// Minimum password length in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

/// A validated signup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignupForm {
    /// Capitalized full name.
    pub name: String,
    /// Lower-cased email within an allowed domain.
    pub email: String,
    /// Password as entered.
    pub password: String,
    /// Declared technologies, in submission order.
    pub techs: Vec<Tech>,
}

/// One technology entry of a [`SignupForm`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Tech {
    /// Technology name.
    pub title: String,
    /// Knowledge level, 1 to 100.
    pub knowledge: u8,
}

/// Build the signup schema, binding the email refinement to `policy`.
///
/// # Errors
///
/// Returns a `SchemaError` only if the definition below is malformed.
pub fn signup_schema(policy: &EmailDomainPolicy) -> Result<SchemaTree, SchemaError> {
    let policy = policy.clone();

    let name = StringNode::new()
        .rule(StringRule::required("O campo nome é obrigatório"))
        .transform(transform::capitalize_words);

    let email = StringNode::new()
        .rule(StringRule::required("O e-mail é obrigatório"))
        .rule(StringRule::email("Formato de e-mail inválido"))
        .transform(transform::lowercase)
        .refine(move |value| email_domain(value, &policy));

    let password = StringNode::new().rule(StringRule::min_length(
        MIN_PASSWORD_LEN,
        "A senha precisa ter no mínimo 6 caracteres",
    ));

    let tech = ObjectNode::builder()
        .field(
            "title",
            StringNode::new()
                .rule(StringRule::required("O título é obrigatório"))
                .transform(transform::trim),
        )
        .field(
            "knowledge",
            NumberNode::new()
                .coerce(true)
                .coercion_message("O conhecimento deve ser um número")
                .rule(NumberRule::required("O conhecimento é obrigatório"))
                .rule(NumberRule::integer("O conhecimento deve ser um número inteiro"))
                .rule(NumberRule::min(1.0, "O conhecimento deve ser no mínimo 1"))
                .rule(NumberRule::max(100.0, "O conhecimento deve ser no máximo 100")),
        )
        .build()?;

    let techs = ArrayNode::builder()
        .element(tech)
        .rule(ArrayRule::min_items(
            MIN_TECHS,
            "Pelo menos 2 tecnologias devem ser informadas",
        ))
        .build()?;

    let root = ObjectNode::builder()
        .field("name", name)
        .field("email", email)
        .field("password", password)
        .field("techs", techs)
        .build()?;

    SchemaTree::new(root)
}
