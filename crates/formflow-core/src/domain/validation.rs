//! Step validation: the result type, the validator capability, and the
//! declarative rule set used by flow documents.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::flow_definition::StepId;
use super::transition::NextStep;
use crate::types::{is_blank, loosely_equal, numeric_value, StepValues};
use crate::CoreError;

/// Outcome of validating one step's input.
///
/// `valid` is derived when the result is built and is never true while
/// `errors` is non-empty or `success` is false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    success: bool,
    valid: bool,
    errors: Vec<String>,
    next_step: Option<NextStep>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::ok()
    }
}

impl ValidationResult {
    /// Start building a result
    pub fn builder() -> ValidationResultBuilder {
        ValidationResultBuilder::default()
    }

    /// Validation ran and the data passed
    pub fn ok() -> Self {
        Self::builder().build()
    }

    /// Validation ran and the data failed with these messages
    pub fn invalid<I, S>(errors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::builder().valid(false).errors(errors).build()
    }

    /// Validation could not run
    pub fn execution_failed(message: impl Into<String>) -> Self {
        Self::builder().success(false).error(message).build()
    }

    /// Whether validation ran without an execution error
    #[inline]
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Whether the data passed the rules
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Error messages, empty when valid
    #[inline]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Explicit next-step override
    #[inline]
    pub fn next_step(&self) -> Option<&NextStep> {
        self.next_step.as_ref()
    }
}

/// Builder for [`ValidationResult`]
#[derive(Debug, Clone)]
pub struct ValidationResultBuilder {
    success: bool,
    valid: bool,
    errors: Vec<String>,
    next_step: Option<NextStep>,
}

impl Default for ValidationResultBuilder {
    fn default() -> Self {
        Self {
            success: true,
            valid: true,
            errors: Vec::new(),
            next_step: None,
        }
    }
}

impl ValidationResultBuilder {
    /// Whether validation ran without error
    pub fn success(mut self, success: bool) -> Self {
        self.success = success;
        self
    }

    /// Mark the data invalid even without messages; `true` cannot override errors
    pub fn valid(mut self, valid: bool) -> Self {
        self.valid = valid;
        self
    }

    /// Append one error message
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.errors.push(message.into());
        self
    }

    /// Append several error messages
    pub fn errors<I, S>(mut self, errors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.errors.extend(errors.into_iter().map(Into::into));
        self
    }

    /// Override the computed transition
    pub fn next_step(mut self, next_step: impl Into<NextStep>) -> Self {
        self.next_step = Some(next_step.into());
        self
    }

    /// Freeze the result
    pub fn build(self) -> ValidationResult {
        let valid = self.success && self.valid && self.errors.is_empty();
        ValidationResult {
            success: self.success,
            valid,
            errors: self.errors,
            next_step: self.next_step,
        }
    }
}

/// Capability validating the input submitted for a step
///
/// Returning `Err` means the validator itself failed; callers turn that into
/// a result with `success == false` instead of propagating it.
pub trait StepValidator: Send + Sync {
    /// Validate one step's submitted values
    fn validate(&self, step_id: &StepId, input: &StepValues) -> Result<ValidationResult, CoreError>;
}

impl<F> StepValidator for F
where
    F: Fn(&StepId, &StepValues) -> Result<ValidationResult, CoreError> + Send + Sync,
{
    fn validate(&self, step_id: &StepId, input: &StepValues) -> Result<ValidationResult, CoreError> {
        self(step_id, input)
    }
}

/// A single declarative field rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum FieldRule {
    /// Field must be present and not blank
    Required,
    /// Minimum number of characters
    MinLength {
        /// Minimum length
        value: usize,
    },
    /// Maximum number of characters
    MaxLength {
        /// Maximum length
        value: usize,
    },
    /// Field must match a regular expression
    Pattern {
        /// Regular expression source
        pattern: String,
    },
    /// Numeric bounds, inclusive
    Range {
        /// Lower bound
        #[serde(default)]
        min: Option<f64>,
        /// Upper bound
        #[serde(default)]
        max: Option<f64>,
    },
    /// Field must be a number or numeric string
    Numeric,
    /// Field must equal one of these values
    OneOf {
        /// Allowed values
        values: Vec<Value>,
    },
    /// Checkbox-style acceptance (`true`, `"1"`, `"yes"`, `"on"`, `"true"`)
    Accepted,
}

/// A rule bound to a field, with an optional custom message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldValidation {
    /// Field the rule applies to
    pub field: String,

    /// Rule definition
    #[serde(flatten)]
    pub rule: FieldRule,

    /// Message replacing the default one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FieldValidation {
    /// Bind a rule to a field
    pub fn new(field: impl Into<String>, rule: FieldRule) -> Self {
        Self {
            field: field.into(),
            rule,
            message: None,
        }
    }

    /// Replace the default message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Check the field; `Ok(None)` when it passes
    ///
    /// A `pattern` rule is compiled on every call; [`RuleSetValidator`]
    /// compiles its patterns once instead.
    pub fn check(&self, input: &StepValues) -> Result<Option<String>, CoreError> {
        let compiled = match &self.rule {
            FieldRule::Pattern { pattern } => Some(compile_pattern(pattern)?),
            _ => None,
        };
        Ok(self.check_with(input, compiled.as_ref()))
    }

    /// `pattern` is the compiled expression of a `pattern` rule
    fn check_with(&self, input: &StepValues, pattern: Option<&Regex>) -> Option<String> {
        let value = input.get(&self.field);
        let blank = value.map_or(true, is_blank);

        // Only `required` and `accepted` look at blank values
        let failure = match &self.rule {
            FieldRule::Required => blank.then(|| "can't be blank".to_string()),
            FieldRule::Accepted => (!value.map_or(false, is_accepted)).then(|| "must be accepted".to_string()),
            _ if blank => None,
            FieldRule::MinLength { value: min } => {
                let len = text_length(value);
                (len < *min).then(|| format!("is too short (minimum is {} characters)", min))
            }
            FieldRule::MaxLength { value: max } => {
                let len = text_length(value);
                (len > *max).then(|| format!("is too long (maximum is {} characters)", max))
            }
            FieldRule::Pattern { .. } => {
                let text = value.map(value_text).unwrap_or_default();
                let matched = pattern.map_or(false, |regex| regex.is_match(&text));
                (!matched).then(|| "is invalid".to_string())
            }
            FieldRule::Range { min, max } => match value.and_then(numeric_value) {
                None => Some("is not a number".to_string()),
                Some(n) if min.map_or(false, |m| n < m) => {
                    Some(format!("must be greater than or equal to {}", min.unwrap_or_default()))
                }
                Some(n) if max.map_or(false, |m| n > m) => {
                    Some(format!("must be less than or equal to {}", max.unwrap_or_default()))
                }
                Some(_) => None,
            },
            FieldRule::Numeric => value
                .and_then(numeric_value)
                .is_none()
                .then(|| "is not a number".to_string()),
            FieldRule::OneOf { values } => {
                let included = value.map_or(false, |v| values.iter().any(|allowed| loosely_equal(v, allowed)));
                (!included).then(|| "is not included in the list".to_string())
            }
        };

        failure.map(|default| match &self.message {
            Some(message) => message.clone(),
            None => format!("{} {}", self.field, default),
        })
    }
}

/// Compile a `pattern` rule, mapping a bad expression to an execution error
pub fn compile_pattern(pattern: &str) -> Result<Regex, CoreError> {
    Regex::new(pattern)
        .map_err(|e| CoreError::ValidationExecution(format!("Invalid pattern '{}': {}", pattern, e)))
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn text_length(value: Option<&Value>) -> usize {
    value.map_or(0, |v| value_text(v).chars().count())
}

fn is_accepted(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() == Some(1.0),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        _ => false,
    }
}

/// Validator made of declarative field rules
///
/// `pattern` rules are compiled when the rule is added. A malformed pattern
/// is kept as an error and reported by every `validate` call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<FieldValidation>", into = "Vec<FieldValidation>")]
pub struct RuleSetValidator {
    rules: Vec<FieldValidation>,
    // one entry per rule, `Some` for pattern rules
    patterns: Vec<Option<Result<Regex, CoreError>>>,
}

impl RuleSetValidator {
    /// Create a validator from rules, checked in order
    pub fn new(rules: Vec<FieldValidation>) -> Self {
        rules.into_iter().fold(Self::default(), Self::push)
    }

    /// Append a rule
    pub fn rule(self, field: impl Into<String>, rule: FieldRule) -> Self {
        self.push(FieldValidation::new(field, rule))
    }

    /// Configured rules
    pub fn rules(&self) -> &[FieldValidation] {
        &self.rules
    }

    fn push(mut self, validation: FieldValidation) -> Self {
        let compiled = match &validation.rule {
            FieldRule::Pattern { pattern } => Some(compile_pattern(pattern)),
            _ => None,
        };
        self.rules.push(validation);
        self.patterns.push(compiled);
        self
    }
}

impl PartialEq for RuleSetValidator {
    fn eq(&self, other: &Self) -> bool {
        self.rules == other.rules
    }
}

impl From<Vec<FieldValidation>> for RuleSetValidator {
    fn from(rules: Vec<FieldValidation>) -> Self {
        Self::new(rules)
    }
}

impl From<RuleSetValidator> for Vec<FieldValidation> {
    fn from(validator: RuleSetValidator) -> Self {
        validator.rules
    }
}

impl StepValidator for RuleSetValidator {
    fn validate(&self, _step_id: &StepId, input: &StepValues) -> Result<ValidationResult, CoreError> {
        let mut errors = Vec::new();
        for (rule, compiled) in self.rules.iter().zip(&self.patterns) {
            let pattern = match compiled {
                Some(Ok(regex)) => Some(regex),
                Some(Err(e)) => return Err(e.clone()),
                None => None,
            };
            if let Some(message) = rule.check_with(input, pattern) {
                errors.push(message);
            }
        }
        if errors.is_empty() {
            Ok(ValidationResult::ok())
        } else {
            Ok(ValidationResult::invalid(errors))
        }
    }
}
