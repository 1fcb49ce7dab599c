//! Conditional transitions between the steps of a flow.
//!
//! A transition rule says "when leaving `from`, go to `to` if `predicate`
//! holds for the submission data". Predicates are a tagged variant so the
//! declarative kinds can be written in YAML while hosts can still plug in
//! arbitrary closures through [`Predicate::Custom`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use super::flow_definition::StepId;
use crate::types::{is_blank, loosely_equal, numeric_value, SubmissionData};

/// Spelling of the terminal sentinel in serialized definitions
pub const COMPLETE_SENTINEL: &str = "$complete";

/// Outcome of next-step evaluation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NextStep {
    /// Continue with this step
    Step(StepId),
    /// The flow is complete
    Complete,
}

impl NextStep {
    /// Shorthand for `NextStep::Step`
    pub fn step(id: impl Into<String>) -> Self {
        NextStep::Step(StepId(id.into()))
    }

    /// Whether this is the terminal sentinel
    #[inline]
    pub fn is_complete(&self) -> bool {
        matches!(self, NextStep::Complete)
    }

    /// The step id, unless this is the terminal sentinel
    #[inline]
    pub fn step_id(&self) -> Option<&StepId> {
        match self {
            NextStep::Step(id) => Some(id),
            NextStep::Complete => None,
        }
    }
}

impl From<String> for NextStep {
    fn from(raw: String) -> Self {
        if raw == COMPLETE_SENTINEL {
            NextStep::Complete
        } else {
            NextStep::Step(StepId(raw))
        }
    }
}

impl From<&str> for NextStep {
    fn from(raw: &str) -> Self {
        NextStep::from(raw.to_string())
    }
}

impl From<NextStep> for String {
    fn from(next: NextStep) -> Self {
        match next {
            NextStep::Step(id) => id.0,
            NextStep::Complete => COMPLETE_SENTINEL.to_string(),
        }
    }
}

impl fmt::Display for NextStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NextStep::Step(id) => write!(f, "{}", id),
            NextStep::Complete => f.write_str(COMPLETE_SENTINEL),
        }
    }
}

/// Numeric comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    /// Strictly less than
    Lt,
    /// Less than or equal
    Lte,
    /// Strictly greater than
    Gt,
    /// Greater than or equal
    Gte,
}

impl CompareOp {
    fn apply(self, left: f64, right: f64) -> bool {
        match self {
            CompareOp::Lt => left < right,
            CompareOp::Lte => left <= right,
            CompareOp::Gt => left > right,
            CompareOp::Gte => left >= right,
        }
    }
}

/// Closure predicate with a label used in logs and `Debug` output
#[derive(Clone)]
pub struct CustomPredicate {
    label: String,
    func: Arc<dyn Fn(&SubmissionData) -> bool + Send + Sync>,
}

impl CustomPredicate {
    /// Wrap a closure
    pub fn new<F>(label: impl Into<String>, func: F) -> Self
    where
        F: Fn(&SubmissionData) -> bool + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            func: Arc::new(func),
        }
    }

    /// Label given at construction
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Debug for CustomPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomPredicate")
            .field("label", &self.label)
            .finish()
    }
}

/// A pure condition over the accumulated submission data
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Predicate {
    /// Always true; useful as an explicit fallback rule
    Always,

    /// Field equals a value (loose comparison of form values)
    Equals {
        /// Step the field belongs to
        step: String,
        /// Field name
        field: String,
        /// Expected value
        value: Value,
    },

    /// Field is missing or differs from a value
    NotEquals {
        /// Step the field belongs to
        step: String,
        /// Field name
        field: String,
        /// Rejected value
        value: Value,
    },

    /// Field is filled in
    Present {
        /// Step the field belongs to
        step: String,
        /// Field name
        field: String,
    },

    /// Field is missing or empty
    Blank {
        /// Step the field belongs to
        step: String,
        /// Field name
        field: String,
    },

    /// Numeric comparison; non-numeric or missing values never match
    Compare {
        /// Step the field belongs to
        step: String,
        /// Field name
        field: String,
        /// Operator, applied as `field <op> value`
        op: CompareOp,
        /// Right-hand side
        value: f64,
    },

    /// Field equals one of several values
    OneOf {
        /// Step the field belongs to
        step: String,
        /// Field name
        field: String,
        /// Accepted values
        values: Vec<Value>,
    },

    /// Every nested predicate holds
    All {
        /// Nested predicates
        predicates: Vec<Predicate>,
    },

    /// At least one nested predicate holds
    Any {
        /// Nested predicates
        predicates: Vec<Predicate>,
    },

    /// Negation
    Not {
        /// Negated predicate
        predicate: Box<Predicate>,
    },

    /// Host-supplied closure; cannot be serialized
    #[serde(skip)]
    Custom(CustomPredicate),
}

impl Predicate {
    /// `step.field == value`
    pub fn equals(step: impl Into<String>, field: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::Equals {
            step: step.into(),
            field: field.into(),
            value: value.into(),
        }
    }

    /// `step.field <op> value`
    pub fn compare(step: impl Into<String>, field: impl Into<String>, op: CompareOp, value: f64) -> Self {
        Predicate::Compare {
            step: step.into(),
            field: field.into(),
            op,
            value,
        }
    }

    /// `step.field` is filled in
    pub fn present(step: impl Into<String>, field: impl Into<String>) -> Self {
        Predicate::Present {
            step: step.into(),
            field: field.into(),
        }
    }

    /// Arbitrary closure
    pub fn custom<F>(label: impl Into<String>, func: F) -> Self
    where
        F: Fn(&SubmissionData) -> bool + Send + Sync + 'static,
    {
        Predicate::Custom(CustomPredicate::new(label, func))
    }

    /// Negate this predicate
    pub fn negate(self) -> Self {
        Predicate::Not {
            predicate: Box::new(self),
        }
    }

    /// Evaluate against the full submission data
    pub fn evaluate(&self, data: &SubmissionData) -> bool {
        match self {
            Predicate::Always => true,
            Predicate::Equals { step, field, value } => data
                .field(step, field)
                .map_or(false, |actual| loosely_equal(actual, value)),
            Predicate::NotEquals { step, field, value } => !data
                .field(step, field)
                .map_or(false, |actual| loosely_equal(actual, value)),
            Predicate::Present { step, field } => {
                data.field(step, field).map_or(false, |actual| !is_blank(actual))
            }
            Predicate::Blank { step, field } => {
                data.field(step, field).map_or(true, is_blank)
            }
            Predicate::Compare { step, field, op, value } => data
                .field(step, field)
                .and_then(numeric_value)
                .map_or(false, |actual| op.apply(actual, *value)),
            Predicate::OneOf { step, field, values } => data
                .field(step, field)
                .map_or(false, |actual| values.iter().any(|v| loosely_equal(actual, v))),
            Predicate::All { predicates } => predicates.iter().all(|p| p.evaluate(data)),
            Predicate::Any { predicates } => predicates.iter().any(|p| p.evaluate(data)),
            Predicate::Not { predicate } => !predicate.evaluate(data),
            Predicate::Custom(custom) => (custom.func)(data),
        }
    }

    /// Step ids whose data this predicate reads
    pub fn referenced_steps(&self) -> Vec<&str> {
        let mut steps = Vec::new();
        self.collect_steps(&mut steps);
        steps
    }

    fn collect_steps<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Predicate::Equals { step, .. }
            | Predicate::NotEquals { step, .. }
            | Predicate::Present { step, .. }
            | Predicate::Blank { step, .. }
            | Predicate::Compare { step, .. }
            | Predicate::OneOf { step, .. } => {
                if !out.contains(&step.as_str()) {
                    out.push(step);
                }
            }
            Predicate::All { predicates } | Predicate::Any { predicates } => {
                for p in predicates {
                    p.collect_steps(out);
                }
            }
            Predicate::Not { predicate } => predicate.collect_steps(out),
            Predicate::Always | Predicate::Custom(_) => {}
        }
    }
}

/// A conditional rule overriding the default step order
#[derive(Debug, Clone)]
pub struct TransitionRule {
    /// Step being left
    pub from: StepId,

    /// Condition over the submission data
    pub predicate: Predicate,

    /// Where to go when the predicate holds
    pub to: NextStep,
}

impl TransitionRule {
    /// Create a new rule
    pub fn new(from: impl Into<StepId>, predicate: Predicate, to: impl Into<NextStep>) -> Self {
        Self {
            from: from.into(),
            predicate,
            to: to.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(value: Value) -> SubmissionData {
        SubmissionData::from_value(value).unwrap()
    }

    #[test]
    fn test_next_step_sentinel_serialization() {
        assert_eq!(NextStep::from("$complete"), NextStep::Complete);
        assert_eq!(NextStep::from("review"), NextStep::step("review"));
        assert_eq!(serde_json::to_string(&NextStep::Complete).unwrap(), "\"$complete\"");
        assert_eq!(NextStep::step("review").to_string(), "review");
        assert!(NextStep::Complete.step_id().is_none());
    }

    #[test]
    fn test_compare_accepts_numeric_strings() {
        let answers = data(json!({"personal": {"age": "17"}}));
        assert!(Predicate::compare("personal", "age", CompareOp::Lt, 18.0).evaluate(&answers));
        assert!(!Predicate::compare("personal", "age", CompareOp::Gte, 18.0).evaluate(&answers));

        let missing = data(json!({"personal": {}}));
        assert!(!Predicate::compare("personal", "age", CompareOp::Lt, 18.0).evaluate(&missing));
        assert!(!Predicate::compare("personal", "age", CompareOp::Gte, 18.0).evaluate(&missing));
    }

    #[test]
    fn test_compare_ignores_non_finite_strings() {
        for raw in ["NaN", "inf", "Infinity"] {
            let answers = data(json!({"personal": {"age": raw}}));
            assert!(!Predicate::compare("personal", "age", CompareOp::Lt, 18.0).evaluate(&answers));
            assert!(!Predicate::compare("personal", "age", CompareOp::Gte, 18.0).evaluate(&answers));
        }
        assert_eq!(numeric_value(&json!("NaN")), None);
        assert_eq!(numeric_value(&json!(" 17.5 ")), Some(17.5));
    }

    #[test]
    fn test_predicates_read_any_prior_step() {
        let answers = data(json!({
            "personal": {"country": "NL"},
            "contact": {"email": ""}
        }));

        assert!(Predicate::equals("personal", "country", "NL").evaluate(&answers));
        assert!(!Predicate::present("contact", "email").evaluate(&answers));
        assert!(Predicate::Blank { step: "contact".into(), field: "email".into() }.evaluate(&answers));
        assert!(Predicate::NotEquals {
            step: "personal".into(),
            field: "missing".into(),
            value: json!("x")
        }
        .evaluate(&answers));
    }

    #[test]
    fn test_combinators_and_custom() {
        let answers = data(json!({"plan": {"tier": "pro", "seats": 12}}));

        let pro_team = Predicate::All {
            predicates: vec![
                Predicate::OneOf {
                    step: "plan".into(),
                    field: "tier".into(),
                    values: vec![json!("pro"), json!("enterprise")],
                },
                Predicate::compare("plan", "seats", CompareOp::Gt, 10.0),
            ],
        };
        assert!(pro_team.evaluate(&answers));
        assert!(!pro_team.clone().negate().evaluate(&answers));

        let custom = Predicate::custom("has plan", |d| d.step("plan").is_some());
        assert!(custom.evaluate(&answers));
        assert!(format!("{:?}", custom).contains("has plan"));
    }

    #[test]
    fn test_predicate_yaml_shape() {
        let predicate: Predicate = serde_json::from_value(json!({
            "type": "any",
            "predicates": [
                {"type": "compare", "step": "a", "field": "x", "op": "gte", "value": 3},
                {"type": "not", "predicate": {"type": "present", "step": "b", "field": "y"}}
            ]
        }))
        .unwrap();

        assert_eq!(predicate.referenced_steps(), vec!["a", "b"]);
        assert!(predicate.evaluate(&data(json!({"a": {"x": 1}}))));
        assert!(serde_json::to_value(Predicate::custom("c", |_| true)).is_err());
    }
}
