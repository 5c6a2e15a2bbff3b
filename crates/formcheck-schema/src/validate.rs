//! # Validation
//!
//! Walks a [`SchemaTree`] against a raw JSON record and produces either the
//! fully normalized record or an [`ErrorMap`] of every failure.
//!
//! ## Algorithm
//!
//! The walk is a single recursive descent, top-down:
//!
//! - **String**: presence rules first (a blank value reports only the
//!   required message), then the remaining rules in declared order. Only a
//!   field whose rules all pass is transformed, and only a transformed value
//!   is refined.
//! - **Number**: the raw value is coerced first when the node allows it.
//!   A value that cannot be coerced reports a coercion failure and its range
//!   rules are skipped.
//! - **Object**: every declared field is validated, regardless of earlier
//!   failures. Undeclared keys are dropped from the normalized output. An
//!   object refinement runs only when all fields passed.
//! - **Array**: collection rules and element validation are independent:
//!   a cardinality failure at `techs` does not suppress `techs.0.title`.
//!
//! ## Determinism
//!
//! No state survives between calls. Each call allocates its own error map
//! and output, never mutates the input, and visits nodes in declaration
//! order, so equal inputs yield equal results.

use formcheck_core::{ErrorMap, FieldPath, Violation, ViolationKind};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::{ReportMode, ValidatorConfig};
use crate::node::{ArrayNode, Node, NumberNode, ObjectNode, StringNode};
use crate::rule::Rule;
use crate::tree::SchemaTree;

/// Largest magnitude at which every integer is exactly representable as `f64`.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Outcome of validating one record. Exactly one variant is populated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum ValidationResult {
    /// Every path passed; the record with all transforms applied.
    Success(Value),
    /// At least one path failed.
    Failure(ErrorMap),
}

impl ValidationResult {
    /// Returns true for [`ValidationResult::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The normalized record, if validation succeeded.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failure(_) => None,
        }
    }

    /// The error map, if validation failed.
    pub fn errors(&self) -> Option<&ErrorMap> {
        match self {
            Self::Success(_) => None,
            Self::Failure(errors) => Some(errors),
        }
    }

    /// Convert into a standard `Result`.
    pub fn into_result(self) -> Result<Value, ErrorMap> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Failure(errors) => Err(errors),
        }
    }
}

/// Error from [`Validator::parse`].
#[derive(Error, Debug)]
pub enum ParseError {
    /// The record failed validation.
    #[error("record failed validation:\n{0}")]
    Invalid(ErrorMap),

    /// The normalized record does not fit the requested type, meaning the
    /// schema and the result type have drifted apart.
    #[error("normalized record does not match the result type: {0}")]
    Shape(#[from] serde_json::Error),
}

/// Stateless schema walker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Validator {
    report_mode: ReportMode,
}

impl Validator {
    /// A validator with the given reporting mode.
    pub fn new(report_mode: ReportMode) -> Self {
        Self { report_mode }
    }

    /// A validator configured from a [`ValidatorConfig`].
    pub fn from_config(config: &ValidatorConfig) -> Self {
        Self::new(config.report_mode)
    }

    /// The reporting mode in effect.
    pub fn report_mode(&self) -> ReportMode {
        self.report_mode
    }

    /// Validate `raw` against `tree`.
    pub fn validate(&self, tree: &SchemaTree, raw: &Value) -> ValidationResult {
        let mut errors = ErrorMap::new();
        let normalized = self.visit(tree.root(), Some(raw), &FieldPath::root(), &mut errors);

        tracing::debug!(
            failed_paths = errors.len(),
            violations = errors.violation_count(),
            "validation finished"
        );

        match normalized {
            Some(value) if errors.is_empty() => ValidationResult::Success(value),
            _ => ValidationResult::Failure(errors),
        }
    }

    /// Validate `raw` and deserialize the normalized record into `T`.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Invalid` if validation fails and
    /// `ParseError::Shape` if the normalized record does not deserialize
    /// into `T`.
    pub fn parse<T: DeserializeOwned>(&self, tree: &SchemaTree, raw: &Value) -> Result<T, ParseError> {
        let value = self
            .validate(tree, raw)
            .into_result()
            .map_err(ParseError::Invalid)?;
        Ok(serde_json::from_value(value)?)
    }

    /// Returns the normalized value when this subtree passed. Every `None`
    /// is accompanied by at least one entry in `errors`.
    fn visit(
        &self,
        node: &Node,
        raw: Option<&Value>,
        path: &FieldPath,
        errors: &mut ErrorMap,
    ) -> Option<Value> {
        match node {
            Node::String(node) => self.visit_string(node, raw, path, errors),
            Node::Number(node) => self.visit_number(node, raw, path, errors),
            Node::Object(node) => self.visit_object(node, raw, path, errors),
            Node::Array(node) => self.visit_array(node, raw, path, errors),
        }
    }

    fn visit_string(
        &self,
        node: &StringNode,
        raw: Option<&Value>,
        path: &FieldPath,
        errors: &mut ErrorMap,
    ) -> Option<Value> {
        let text = match raw {
            None | Some(Value::Null) => "",
            Some(Value::String(s)) => s.as_str(),
            Some(_) => {
                self.reject(errors, path, vec![coercion(node.type_mismatch_message())]);
                return None;
            }
        };

        if !self.apply_rules(node.rules(), text, path, errors) {
            return None;
        }

        let normalized = node.apply_transform(text);
        tracing::trace!(path = %path, "transform applied");

        if let Err(message) = node.apply_refine(&normalized) {
            self.reject(
                errors,
                path,
                vec![Violation::new(ViolationKind::Refinement, message)],
            );
            return None;
        }

        Some(Value::String(normalized))
    }

    fn visit_number(
        &self,
        node: &NumberNode,
        raw: Option<&Value>,
        path: &FieldPath,
        errors: &mut ErrorMap,
    ) -> Option<Value> {
        let number = match raw {
            None | Some(Value::Null) => None,
            Some(Value::Number(n)) => match n.as_f64() {
                Some(n) => Some(n),
                None => {
                    self.reject(errors, path, vec![coercion(node.coercion_failure_message())]);
                    return None;
                }
            },
            Some(Value::String(s)) if node.coerces() => {
                let text = s.trim();
                if text.is_empty() {
                    None
                } else {
                    match text.parse::<f64>() {
                        Ok(n) if n.is_finite() => Some(n),
                        _ => {
                            self.reject(errors, path, vec![coercion(node.coercion_failure_message())]);
                            return None;
                        }
                    }
                }
            }
            Some(_) => {
                self.reject(errors, path, vec![coercion(node.coercion_failure_message())]);
                return None;
            }
        };

        let Some(number) = number else {
            // Missing or blank input: the required message if there is one,
            // otherwise the value simply is not a number.
            let violation = node
                .rules()
                .iter()
                .find(|rule| rule.is_required())
                .map(|rule| Violation::new(ViolationKind::Required, rule.message()))
                .unwrap_or_else(|| coercion(node.coercion_failure_message()));
            self.reject(errors, path, vec![violation]);
            return None;
        };

        if !self.apply_rules(node.rules(), &number, path, errors) {
            return None;
        }

        Some(number_value(number))
    }

    fn visit_object(
        &self,
        node: &ObjectNode,
        raw: Option<&Value>,
        path: &FieldPath,
        errors: &mut ErrorMap,
    ) -> Option<Value> {
        let empty = Map::new();
        let input = match raw {
            None | Some(Value::Null) => &empty,
            Some(Value::Object(map)) => map,
            Some(_) => {
                self.reject(errors, path, vec![coercion(node.type_mismatch_message())]);
                return None;
            }
        };

        let mut output = Map::new();
        let mut all_passed = true;
        for (name, child) in node.fields() {
            match self.visit(child, input.get(name), &path.field(name), errors) {
                Some(value) => {
                    output.insert(name.to_string(), value);
                }
                None => all_passed = false,
            }
        }

        if !all_passed {
            return None;
        }

        if let Err(issue) = node.apply_refine(&output) {
            self.reject(
                errors,
                &path.join(&issue.path),
                vec![Violation::new(ViolationKind::Refinement, issue.message)],
            );
            return None;
        }

        Some(Value::Object(output))
    }

    fn visit_array(
        &self,
        node: &ArrayNode,
        raw: Option<&Value>,
        path: &FieldPath,
        errors: &mut ErrorMap,
    ) -> Option<Value> {
        let items: &[Value] = match raw {
            None | Some(Value::Null) => &[],
            Some(Value::Array(items)) => items,
            Some(_) => {
                self.reject(errors, path, vec![coercion(node.type_mismatch_message())]);
                return None;
            }
        };

        // Collection rules and elements are independent concerns; both are
        // always evaluated.
        let collection_passed = self.apply_rules(node.rules(), items, path, errors);

        let mut output = Vec::with_capacity(items.len());
        let mut elements_passed = true;
        for (index, item) in items.iter().enumerate() {
            match self.visit(node.element(), Some(item), &path.index(index), errors) {
                Some(value) => output.push(value),
                None => elements_passed = false,
            }
        }

        (collection_passed && elements_passed).then_some(Value::Array(output))
    }

    /// Run a rule list, recording failures at `path`. Returns whether every
    /// rule passed.
    ///
    /// A failing presence rule short-circuits: only its message is reported.
    /// Otherwise every rule is evaluated, and the report mode decides how
    /// many of the failures are recorded.
    fn apply_rules<T: ?Sized>(
        &self,
        rules: &[Rule<T>],
        value: &T,
        path: &FieldPath,
        errors: &mut ErrorMap,
    ) -> bool {
        if let Some(missing) = rules
            .iter()
            .filter(|rule| rule.is_required())
            .find_map(|rule| rule.evaluate(value).err())
        {
            self.reject(errors, path, vec![missing]);
            return false;
        }

        let failures: Vec<Violation> = rules
            .iter()
            .filter(|rule| !rule.is_required())
            .filter_map(|rule| rule.evaluate(value).err())
            .collect();

        if failures.is_empty() {
            true
        } else {
            self.reject(errors, path, failures);
            false
        }
    }

    fn reject(&self, errors: &mut ErrorMap, path: &FieldPath, failures: Vec<Violation>) {
        let keep = match self.report_mode {
            ReportMode::FirstPerField => 1,
            ReportMode::AllPerField => failures.len(),
        };
        for v in failures.iter().take(keep) {
            tracing::debug!(path = %path, kind = %v.kind, "field rejected");
        }
        errors.record_all(path.clone(), failures.into_iter().take(keep));
    }
}

/// Validate `raw` against `tree` with default settings.
pub fn validate(tree: &SchemaTree, raw: &Value) -> ValidationResult {
    Validator::default().validate(tree, raw)
}

fn coercion(message: &str) -> Violation {
    Violation::new(ViolationKind::Coercion, message)
}

/// Integral values within the exactly-representable range become JSON
/// integers; everything else stays a float.
fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Issue;
    use crate::rule::{ArrayRule, NumberRule, StringRule};
    use crate::transform;
    use serde_json::json;

    fn path(s: &str) -> FieldPath {
        s.parse().unwrap()
    }

    fn password_tree() -> SchemaTree {
        let root = ObjectNode::builder()
            .field(
                "password",
                StringNode::new()
                    .rule(StringRule::required("password required"))
                    .rule(StringRule::min_length(6, "too short"))
                    .rule(StringRule::pattern(r"\d", "needs a digit").unwrap()),
            )
            .field("confirm", StringNode::new())
            .refine(|obj| {
                if obj.get("password") == obj.get("confirm") {
                    Ok(())
                } else {
                    Err(Issue::at_field("confirm", "passwords differ"))
                }
            })
            .build()
            .unwrap();
        SchemaTree::new(root).unwrap()
    }

    fn scores_tree() -> SchemaTree {
        let root = ObjectNode::builder()
            .field(
                "scores",
                ArrayNode::builder()
                    .element(
                        NumberNode::new()
                            .coerce(true)
                            .coercion_message("not a number")
                            .rule(NumberRule::required("score required"))
                            .rule(NumberRule::min(0.0, "negative"))
                            .rule(NumberRule::max(10.0, "over ten")),
                    )
                    .rule(ArrayRule::min_items(2, "need two scores"))
                    .rule(ArrayRule::max_items(4, "at most four"))
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();
        SchemaTree::new(root).unwrap()
    }

    #[test]
    fn test_required_short_circuits_other_rules() {
        let validator = Validator::new(ReportMode::AllPerField);
        let result = validator.validate(&password_tree(), &json!({"password": ""}));
        let errors = result.errors().unwrap();
        let at = errors.get(&path("password")).unwrap();
        assert_eq!(at.len(), 1);
        assert_eq!(at[0].kind, ViolationKind::Required);
    }

    #[test]
    fn test_first_per_field_reports_one_message() {
        let result = validate(&password_tree(), &json!({"password": "abc"}));
        let errors = result.errors().unwrap();
        assert_eq!(errors.get(&path("password")).unwrap().len(), 1);
        assert_eq!(errors.first_message(&path("password")), Some("too short"));
    }

    #[test]
    fn test_all_per_field_reports_every_failure_in_order() {
        let validator = Validator::new(ReportMode::AllPerField);
        let result = validator.validate(&password_tree(), &json!({"password": "abc"}));
        let messages: Vec<&str> = result
            .errors()
            .unwrap()
            .get(&path("password"))
            .unwrap()
            .iter()
            .map(|v| v.message.as_str())
            .collect();
        assert_eq!(messages, vec!["too short", "needs a digit"]);
    }

    #[test]
    fn test_object_refinement_runs_after_fields_pass() {
        let result = validate(
            &password_tree(),
            &json!({"password": "abc123", "confirm": "abc124"}),
        );
        let errors = result.errors().unwrap();
        assert_eq!(errors.first_message(&path("confirm")), Some("passwords differ"));
        assert_eq!(
            errors.get(&path("confirm")).unwrap()[0].kind,
            ViolationKind::Refinement
        );

        let ok = validate(
            &password_tree(),
            &json!({"password": "abc123", "confirm": "abc123"}),
        );
        assert!(ok.is_success());
    }

    #[test]
    fn test_object_refinement_skipped_when_field_fails() {
        let result = validate(&password_tree(), &json!({"password": "a", "confirm": "b"}));
        let errors = result.errors().unwrap();
        assert!(errors.contains(&path("password")));
        assert!(!errors.contains(&path("confirm")));
    }

    #[test]
    fn test_undeclared_keys_are_dropped() {
        let result = validate(
            &password_tree(),
            &json!({"password": "abc123", "confirm": "abc123", "extra": true}),
        );
        assert_eq!(
            result.value().unwrap(),
            &json!({"password": "abc123", "confirm": "abc123"})
        );
    }

    #[test]
    fn test_type_mismatch_is_coercion_failure() {
        let result = validate(&password_tree(), &json!({"password": 123456}));
        let v = &result.errors().unwrap().get(&path("password")).unwrap()[0];
        assert_eq!(v.kind, ViolationKind::Coercion);
    }

    #[test]
    fn test_non_object_root_input() {
        let result = validate(&password_tree(), &json!([1, 2]));
        let errors = result.errors().unwrap();
        assert_eq!(
            errors.get(&FieldPath::root()).unwrap()[0].kind,
            ViolationKind::Coercion
        );
    }

    #[test]
    fn test_coercion_and_range() {
        let result = validate(&scores_tree(), &json!({"scores": ["3", " 7.5 ", 10]}));
        assert_eq!(result.value().unwrap(), &json!({"scores": [3, 7.5, 10]}));
    }

    #[test]
    fn test_coercion_failure_skips_range_rules() {
        let validator = Validator::new(ReportMode::AllPerField);
        let result = validator.validate(&scores_tree(), &json!({"scores": ["abc", "99"]}));
        let errors = result.errors().unwrap();
        let first = errors.get(&path("scores.0")).unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].kind, ViolationKind::Coercion);
        assert_eq!(first[0].message, "not a number");
        assert_eq!(errors.first_message(&path("scores.1")), Some("over ten"));
    }

    #[test]
    fn test_non_finite_text_is_not_a_number() {
        let result = validate(&scores_tree(), &json!({"scores": ["NaN", "inf"]}));
        let errors = result.errors().unwrap();
        assert_eq!(errors.first_message(&path("scores.0")), Some("not a number"));
        assert_eq!(errors.first_message(&path("scores.1")), Some("not a number"));
    }

    #[test]
    fn test_blank_number_reports_required() {
        let result = validate(&scores_tree(), &json!({"scores": ["  ", null]}));
        let errors = result.errors().unwrap();
        assert_eq!(errors.first_message(&path("scores.0")), Some("score required"));
        assert_eq!(errors.first_message(&path("scores.1")), Some("score required"));
    }

    #[test]
    fn test_number_without_coerce_rejects_text() {
        let root = ObjectNode::builder()
            .field("n", NumberNode::new())
            .build()
            .unwrap();
        let tree = SchemaTree::new(root).unwrap();
        let result = validate(&tree, &json!({"n": "5"}));
        assert_eq!(
            result.errors().unwrap().get(&path("n")).unwrap()[0].kind,
            ViolationKind::Coercion
        );
        assert!(validate(&tree, &json!({"n": 5})).is_success());
    }

    #[test]
    fn test_cardinality_and_element_errors_reported_together() {
        let result = validate(&scores_tree(), &json!({"scores": ["11"]}));
        let errors = result.errors().unwrap();
        assert_eq!(errors.first_message(&path("scores")), Some("need two scores"));
        assert_eq!(
            errors.get(&path("scores")).unwrap()[0].kind,
            ViolationKind::Cardinality
        );
        assert_eq!(errors.first_message(&path("scores.0")), Some("over ten"));
    }

    #[test]
    fn test_missing_array_is_empty() {
        let result = validate(&scores_tree(), &json!({}));
        let errors = result.errors().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.first_message(&path("scores")), Some("need two scores"));
    }

    #[test]
    fn test_non_array_is_coercion_failure() {
        let result = validate(&scores_tree(), &json!({"scores": "1,2"}));
        assert_eq!(
            result.errors().unwrap().get(&path("scores")).unwrap()[0].kind,
            ViolationKind::Coercion
        );
    }

    #[test]
    fn test_each_element_reports_at_own_index() {
        let result = validate(&scores_tree(), &json!({"scores": ["-1", "5", "20"]}));
        let errors = result.errors().unwrap();
        assert_eq!(errors.first_message(&path("scores.0")), Some("negative"));
        assert!(!errors.contains(&path("scores.1")));
        assert_eq!(errors.first_message(&path("scores.2")), Some("over ten"));
        assert!(!errors.contains(&path("scores")));
    }

    #[test]
    fn test_length_changes_between_calls_are_independent() {
        let validator = Validator::default();
        let tree = scores_tree();
        let grown = validator.validate(&tree, &json!({"scores": ["1", "2", "x"]}));
        assert!(grown.errors().unwrap().contains(&path("scores.2")));

        let shrunk = validator.validate(&tree, &json!({"scores": ["1", "2"]}));
        assert!(shrunk.is_success());
    }

    #[test]
    fn test_string_refinement_sees_transformed_value() {
        let root = ObjectNode::builder()
            .field(
                "code",
                StringNode::new()
                    .transform(transform::lowercase)
                    .refine(|s| {
                        if s == "abc" {
                            Ok(())
                        } else {
                            Err("wrong code".to_string())
                        }
                    }),
            )
            .build()
            .unwrap();
        let tree = SchemaTree::new(root).unwrap();

        assert_eq!(
            validate(&tree, &json!({"code": " ABC "})).value().unwrap(),
            &json!({"code": "abc"})
        );
        let failed = validate(&tree, &json!({"code": "abd"}));
        let v = &failed.errors().unwrap().get(&path("code")).unwrap()[0];
        assert_eq!(v.kind, ViolationKind::Refinement);
        assert_eq!(v.message, "wrong code");
    }

    #[test]
    fn test_parse_into_typed_value() {
        #[derive(serde::Deserialize, Debug, PartialEq)]
        struct Scores {
            scores: Vec<f64>,
        }
        let validator = Validator::default();
        let parsed: Scores = validator
            .parse(&scores_tree(), &json!({"scores": ["1", "2.5"]}))
            .unwrap();
        assert_eq!(parsed, Scores { scores: vec![1.0, 2.5] });

        let err = validator
            .parse::<Scores>(&scores_tree(), &json!({"scores": []}))
            .unwrap_err();
        assert!(matches!(err, ParseError::Invalid(_)));
    }

    #[test]
    fn test_parse_shape_mismatch() {
        #[derive(serde::Deserialize, Debug)]
        #[allow(dead_code)]
        struct Wrong {
            scores: Vec<String>,
        }
        let err = Validator::default()
            .parse::<Wrong>(&scores_tree(), &json!({"scores": [1, 2]}))
            .unwrap_err();
        assert!(matches!(err, ParseError::Shape(_)));
    }

    #[test]
    fn test_result_serialization() {
        let failed = validate(&scores_tree(), &json!({"scores": []}));
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({"status": "failure", "data": {"scores": ["need two scores"]}})
        );
    }

    #[test]
    fn test_number_value_normalization() {
        assert_eq!(number_value(3.0), json!(3));
        assert_eq!(number_value(-0.0), json!(0));
        assert_eq!(number_value(2.5), json!(2.5));
        assert_eq!(number_value(1e300), json!(1e300));
    }
}
