use crate::error::DslError;
use crate::flow::ParsedDocument;
use std::error::Error;
use std::fmt;

mod flow_validator;
mod reference;
mod rules;

/// Represents a validation error that occurred during DSL processing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Error code (should be a constant identifier)
    pub code: &'static str,

    /// Human-readable error message
    pub message: String,

    /// Optional path to the location of the error (e.g., "flows[0].steps[2]")
    pub path: Option<String>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(path) = &self.path {
            write!(f, "{}: {} (at {})", self.code, self.message, path)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

impl Error for ValidationError {}

/// Validation error codes
pub mod error_codes {
    /// Invalid reference (unknown step in a transition or condition)
    pub const INVALID_REFERENCE: &str = "ERR_DSL_VALIDATION_INVALID_REFERENCE";

    /// Duplicate ID found (flow name or step id)
    pub const DUPLICATE_ID: &str = "ERR_DSL_VALIDATION_DUPLICATE_ID";

    /// Identifier using reserved or empty spelling
    pub const RESERVED_ID: &str = "ERR_DSL_VALIDATION_RESERVED_ID";

    /// Missing required field
    pub const MISSING_REQUIRED_FIELD: &str = "ERR_DSL_VALIDATION_MISSING_REQUIRED_FIELD";

    /// Invalid regular expression in a pattern rule
    pub const INVALID_PATTERN: &str = "ERR_DSL_VALIDATION_INVALID_PATTERN";

    /// Field rule with contradictory bounds
    pub const INVALID_RULE: &str = "ERR_DSL_VALIDATION_INVALID_RULE";
}

/// A trait for validators that check specific aspects of the DSL document
pub trait Validator {
    /// Validate the document and return a list of validation errors (if any)
    fn validate(&self, document: &ParsedDocument) -> Vec<ValidationError>;
}

/// Validate a parsed DSL document, collecting the problems of every validator
pub fn validate_document(document: &ParsedDocument) -> Result<(), DslError> {
    let validators: Vec<Box<dyn Validator>> = vec![
        Box::new(flow_validator::FlowValidator::new()),
        Box::new(reference::ReferenceValidator::new()),
        Box::new(rules::RuleValidator::new()),
    ];

    let mut errors = Vec::new();
    for validator in validators {
        errors.extend(validator.validate(document));
    }

    if !errors.is_empty() {
        return Err(DslError::from_validation_errors(errors));
    }

    Ok(())
}
