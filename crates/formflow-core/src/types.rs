use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::CoreError;

/// Field values submitted for a single step, keyed by field name
pub type StepValues = serde_json::Map<String, Value>;

/// Accumulated answers of a submission, keyed by step id
///
/// Serialized as a JSON object of objects, e.g.
/// `{"personal": {"name": "Ada", "age": "36"}}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionData {
    steps: BTreeMap<String, StepValues>,
}

impl SubmissionData {
    /// Create empty submission data
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper adding one step's values
    pub fn with_step(mut self, step_id: impl Into<String>, values: StepValues) -> Self {
        self.steps.insert(step_id.into(), values);
        self
    }

    /// Values submitted for a step
    #[inline]
    pub fn step(&self, step_id: &str) -> Option<&StepValues> {
        self.steps.get(step_id)
    }

    /// A single field of a step
    #[inline]
    pub fn field(&self, step_id: &str, field: &str) -> Option<&Value> {
        self.steps.get(step_id).and_then(|values| values.get(field))
    }

    /// Merge values into a step; fields present in `values` overwrite existing ones
    pub fn merge_step(&mut self, step_id: &str, values: StepValues) {
        let entry = self.steps.entry(step_id.to_string()).or_default();
        for (field, value) in values {
            entry.insert(field, value);
        }
    }

    /// Replace all values of a step
    pub fn replace_step(&mut self, step_id: &str, values: StepValues) {
        self.steps.insert(step_id.to_string(), values);
    }

    /// Step ids that have data, in lexical order
    pub fn step_ids(&self) -> impl Iterator<Item = &str> {
        self.steps.keys().map(String::as_str)
    }

    /// Whether no step has data
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Serialize into the opaque text stored next to a submission
    pub fn to_json_string(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse the opaque text produced by [`SubmissionData::to_json_string`]
    pub fn from_json_str(raw: &str) -> Result<Self, CoreError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(raw)?)
    }

    /// Build from a JSON value shaped as an object of objects
    pub fn from_value(value: Value) -> Result<Self, CoreError> {
        Ok(serde_json::from_value(value)?)
    }
}

/// Interpret a submitted value as a number.
///
/// Form inputs usually arrive as strings, so numeric strings are accepted.
/// Only finite numbers count: `"NaN"` and `"inf"` are not numbers here.
pub fn numeric_value(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

/// Whether a submitted value counts as "not filled in"
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Equality used for form values: `"18" == 18` and `"true" == true`
pub fn loosely_equal(left: &Value, right: &Value) -> bool {
    if left == right {
        return true;
    }
    match (left, right) {
        (Value::String(s), Value::Number(_)) | (Value::Number(_), Value::String(s)) => {
            let number = if left.is_number() { left } else { right };
            match (s.trim().parse::<f64>().ok(), number.as_f64()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            }
        }
        (Value::String(s), Value::Bool(b)) | (Value::Bool(b), Value::String(s)) => {
            s.trim().eq_ignore_ascii_case(if *b { "true" } else { "false" })
        }
        _ => false,
    }
}
