//! # Rules — Atomic Constraint Checks
//!
//! A [`Rule`] pairs a pure predicate over a value of a known kind with the
//! message reported when the predicate fails. Rules are stateless and cheap
//! to clone (the predicate is reference-counted), so one rule can be shared
//! across any number of nodes.
//!
//! ## Purity
//!
//! Every predicate must be a pure function of its input. The validator
//! evaluates all of a field's rules in declared order; purity guarantees that
//! order only affects *which* message is reported first, never whether the
//! field passes.
//!
//! ## Kinds
//!
//! | Value kind | Constructors |
//! |------------|--------------|
//! | `str`      | `required`, `min_length`, `max_length`, `email`, `pattern` |
//! | `f64`      | `required`, `min`, `max`, `integer` |
//! | `[Value]`  | `min_items`, `max_items` |
//!
//! [`Rule::new`] builds a custom rule over any of these kinds.

use std::fmt;
use std::sync::{Arc, OnceLock};

use formcheck_core::{SchemaError, Violation, ViolationKind};
use regex::Regex;
use serde_json::Value;

/// Syntactic email check. Permissive in the local part; the
/// domain must contain at least one dot-separated label after the first.
const EMAIL_PATTERN: &str = r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$";

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("EMAIL_PATTERN is a valid regex"))
}

/// A declared bound carried by range-style rules, used to reject
/// contradictory rule lists when a schema tree is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Limit {
    /// Inclusive lower bound.
    Lower(f64),
    /// Inclusive upper bound.
    Upper(f64),
}

/// A single atomic constraint over values of type `T`.
pub struct Rule<T: ?Sized> {
    kind: ViolationKind,
    tag: &'static str,
    check: Arc<dyn Fn(&T) -> bool + Send + Sync>,
    message: String,
    limit: Option<Limit>,
}

/// A rule over string values.
pub type StringRule = Rule<str>;

/// A rule over (possibly coerced) numeric values.
pub type NumberRule = Rule<f64>;

/// A rule over a whole collection, independent of its elements.
pub type ArrayRule = Rule<[Value]>;

impl<T: ?Sized> Clone for Rule<T> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            tag: self.tag,
            check: Arc::clone(&self.check),
            message: self.message.clone(),
            limit: self.limit,
        }
    }
}

impl<T: ?Sized> fmt::Debug for Rule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("kind", &self.kind)
            .field("tag", &self.tag)
            .field("message", &self.message)
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}

impl<T: ?Sized> Rule<T> {
    /// Build a custom rule.
    ///
    /// `tag` names the predicate for diagnostics; `check` returns `true`
    /// when the value is acceptable.
    pub fn new(
        kind: ViolationKind,
        tag: &'static str,
        check: impl Fn(&T) -> bool + Send + Sync + 'static,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            tag,
            check: Arc::new(check),
            message: message.into(),
            limit: None,
        }
    }

    fn with_limit(mut self, limit: Limit) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Evaluate the rule. Failure is a normal return value.
    pub fn evaluate(&self, value: &T) -> Result<(), Violation> {
        if (self.check)(value) {
            Ok(())
        } else {
            Err(Violation::new(self.kind, self.message.clone()))
        }
    }

    /// The violation kind reported on failure.
    pub fn kind(&self) -> ViolationKind {
        self.kind
    }

    /// The predicate tag, e.g. `"min_length"`.
    pub fn tag(&self) -> &'static str {
        self.tag
    }

    /// The failure message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The bound declared by this rule, if it is a range-style rule.
    pub fn limit(&self) -> Option<Limit> {
        self.limit
    }

    /// Returns true for presence rules, which short-circuit a field's pipeline.
    pub fn is_required(&self) -> bool {
        self.kind == ViolationKind::Required
    }
}

impl Rule<str> {
    /// The value must contain something other than whitespace.
    pub fn required(message: impl Into<String>) -> Self {
        Self::new(
            ViolationKind::Required,
            "required",
            |s: &str| !s.trim().is_empty(),
            message,
        )
    }

    /// At least `min` characters (Unicode scalar values).
    pub fn min_length(min: usize, message: impl Into<String>) -> Self {
        Self::new(
            ViolationKind::Format,
            "min_length",
            move |s: &str| s.chars().count() >= min,
            message,
        )
        .with_limit(Limit::Lower(min as f64))
    }

    /// At most `max` characters (Unicode scalar values).
    pub fn max_length(max: usize, message: impl Into<String>) -> Self {
        Self::new(
            ViolationKind::Format,
            "max_length",
            move |s: &str| s.chars().count() <= max,
            message,
        )
        .with_limit(Limit::Upper(max as f64))
    }

    /// The value is syntactically an email address.
    pub fn email(message: impl Into<String>) -> Self {
        Self::new(
            ViolationKind::Format,
            "email",
            |s: &str| email_regex().is_match(s),
            message,
        )
    }

    /// The value matches a regular expression.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::InvalidPattern` if `pattern` does not compile.
    pub fn pattern(pattern: &str, message: impl Into<String>) -> Result<Self, SchemaError> {
        let regex = Regex::new(pattern).map_err(|e| SchemaError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::new(
            ViolationKind::Format,
            "pattern",
            move |s: &str| regex.is_match(s),
            message,
        ))
    }
}

impl Rule<f64> {
    /// Marks a numeric field as mandatory.
    ///
    /// Presence is decided before coercion, so the predicate itself always
    /// passes; the message is reported when the raw value is missing or blank.
    pub fn required(message: impl Into<String>) -> Self {
        Self::new(ViolationKind::Required, "required", |_: &f64| true, message)
    }

    /// Inclusive lower bound.
    pub fn min(min: f64, message: impl Into<String>) -> Self {
        Self::new(ViolationKind::Range, "min", move |n: &f64| *n >= min, message)
            .with_limit(Limit::Lower(min))
    }

    /// Inclusive upper bound.
    pub fn max(max: f64, message: impl Into<String>) -> Self {
        Self::new(ViolationKind::Range, "max", move |n: &f64| *n <= max, message)
            .with_limit(Limit::Upper(max))
    }

    /// The value has no fractional part.
    pub fn integer(message: impl Into<String>) -> Self {
        Self::new(
            ViolationKind::Format,
            "integer",
            |n: &f64| n.fract() == 0.0,
            message,
        )
    }
}

impl Rule<[Value]> {
    /// At least `min` elements.
    pub fn min_items(min: usize, message: impl Into<String>) -> Self {
        Self::new(
            ViolationKind::Cardinality,
            "min_items",
            move |items: &[Value]| items.len() >= min,
            message,
        )
        .with_limit(Limit::Lower(min as f64))
    }

    /// At most `max` elements.
    pub fn max_items(max: usize, message: impl Into<String>) -> Self {
        Self::new(
            ViolationKind::Cardinality,
            "max_items",
            move |items: &[Value]| items.len() <= max,
            message,
        )
        .with_limit(Limit::Upper(max as f64))
    }
}

/// Reject a rule list whose lower bound exceeds its upper bound.
pub(crate) fn check_limits<T: ?Sized>(rules: &[Rule<T>]) -> Result<(), SchemaError> {
    let lower = rules
        .iter()
        .filter_map(|r| match r.limit {
            Some(Limit::Lower(v)) => Some(v),
            _ => None,
        })
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))));
    let upper = rules
        .iter()
        .filter_map(|r| match r.limit {
            Some(Limit::Upper(v)) => Some(v),
            _ => None,
        })
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.min(v))));

    match (lower, upper) {
        (Some(min), Some(max)) if min > max => Err(SchemaError::InvertedBounds {
            min: min.to_string(),
            max: max.to_string(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_required_rejects_blank() {
        let rule = StringRule::required("required");
        assert!(rule.evaluate("").is_err());
        assert!(rule.evaluate("   ").is_err());
        assert!(rule.evaluate("a").is_ok());
        assert!(rule.is_required());
    }

    #[test]
    fn test_min_length_counts_chars() {
        let rule = StringRule::min_length(6, "too short");
        assert!(rule.evaluate("12345").is_err());
        assert!(rule.evaluate("123456").is_ok());
        // Six two-byte characters.
        assert!(rule.evaluate("áéíóúç").is_ok());

        let v = rule.evaluate("abc").unwrap_err();
        assert_eq!(v.kind, ViolationKind::Format);
        assert_eq!(v.message, "too short");
    }

    #[test]
    fn test_email_syntax() {
        let rule = StringRule::email("bad email");
        assert!(rule.evaluate("joe@rocketseat.com.br").is_ok());
        assert!(rule.evaluate("JOE@ROCKETSEAT.COM.BR").is_ok());
        assert!(rule.evaluate("joe@example.com").is_ok());
        assert!(rule.evaluate("joe").is_err());
        assert!(rule.evaluate("joe@").is_err());
        assert!(rule.evaluate("joe@localhost").is_err());
        assert!(rule.evaluate("joe doe@example.com").is_err());
        assert!(rule.evaluate("joe@-example.com").is_err());
    }

    #[test]
    fn test_pattern_rule() {
        let rule = StringRule::pattern(r"^\d{5}-\d{3}$", "bad postcode").unwrap();
        assert!(rule.evaluate("01310-100").is_ok());
        assert!(rule.evaluate("01310100").is_err());
    }

    #[test]
    fn test_invalid_pattern_is_schema_error() {
        let err = StringRule::pattern("(unclosed", "x").unwrap_err();
        assert!(matches!(err, SchemaError::InvalidPattern { .. }));
    }

    #[test]
    fn test_numeric_range() {
        let min = NumberRule::min(1.0, "low");
        let max = NumberRule::max(100.0, "high");
        assert!(min.evaluate(&1.0).is_ok());
        assert!(min.evaluate(&0.5).is_err());
        assert!(max.evaluate(&100.0).is_ok());
        assert_eq!(max.evaluate(&101.0).unwrap_err().kind, ViolationKind::Range);
    }

    #[test]
    fn test_integer_rule() {
        let rule = NumberRule::integer("whole numbers only");
        assert!(rule.evaluate(&42.0).is_ok());
        assert!(rule.evaluate(&4.2).is_err());
    }

    #[test]
    fn test_min_items() {
        let rule = ArrayRule::min_items(2, "at least two");
        let one = vec![json!({})];
        let two = vec![json!({}), json!({})];
        assert_eq!(
            rule.evaluate(one.as_slice()).unwrap_err().kind,
            ViolationKind::Cardinality
        );
        assert!(rule.evaluate(two.as_slice()).is_ok());
    }

    #[test]
    fn test_custom_rule() {
        let rule = StringRule::new(
            ViolationKind::Format,
            "no_digits",
            |s: &str| !s.chars().any(|c| c.is_ascii_digit()),
            "digits are not allowed",
        );
        assert!(rule.evaluate("abc").is_ok());
        assert!(rule.evaluate("a1c").is_err());
        assert_eq!(rule.tag(), "no_digits");
    }

    #[test]
    fn test_cloned_rule_shares_predicate() {
        let rule = StringRule::max_length(3, "too long");
        let copy = rule.clone();
        assert_eq!(rule.evaluate("abcd"), copy.evaluate("abcd"));
    }

    #[test]
    fn test_check_limits() {
        let ok = vec![NumberRule::min(1.0, "a"), NumberRule::max(100.0, "b")];
        assert!(check_limits(&ok).is_ok());

        let inverted = vec![NumberRule::min(10.0, "a"), NumberRule::max(5.0, "b")];
        assert!(matches!(
            check_limits(&inverted),
            Err(SchemaError::InvertedBounds { .. })
        ));

        let lengths = vec![
            StringRule::min_length(8, "a"),
            StringRule::max_length(4, "b"),
        ];
        assert!(check_limits(&lengths).is_err());
    }
}
