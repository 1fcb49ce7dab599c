use crate::validation::ValidationError;
use formflow_core::CoreError;
use std::fmt;
use thiserror::Error;

/// All possible errors that can occur in the DSL processing
#[derive(Error, Debug)]
pub enum DslError {
    /// Errors that occur during YAML parsing
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A single validation error
    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationError),

    /// Multiple validation errors
    #[error("{}", MultipleErrorsFormat(.0))]
    MultipleValidationErrors(Vec<ValidationError>),

    /// Unsupported DSL version
    #[error("Unsupported DSL version: {0}")]
    UnsupportedVersion(String),

    /// A flow file or directory could not be read
    #[error("I/O error on {path}: {source}")]
    IoError {
        /// File or directory involved
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The engine refused a definition while building the registry
    #[error("Registry error: {0}")]
    RegistryError(#[from] CoreError),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

// Helper struct to format multiple errors
struct MultipleErrorsFormat<'a>(&'a [ValidationError]);

impl fmt::Display for MultipleErrorsFormat<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Multiple validation errors ({} issues):", self.0.len())?;
        for (i, err) in self.0.iter().enumerate() {
            write!(f, "\n  {}. {}", i + 1, err)?;
        }
        Ok(())
    }
}

impl DslError {
    /// Create a DslError from a vector of validation errors
    pub fn from_validation_errors(mut errors: Vec<ValidationError>) -> Self {
        if errors.len() > 1 {
            return DslError::MultipleValidationErrors(errors);
        }
        match errors.pop() {
            Some(error) => DslError::ValidationError(error),
            None => DslError::InternalError("Called from_validation_errors with empty vector".to_string()),
        }
    }

    /// Validation errors carried by this error, if any
    pub fn validation_errors(&self) -> Vec<&ValidationError> {
        match self {
            DslError::ValidationError(err) => vec![err],
            DslError::MultipleValidationErrors(errs) => errs.iter().collect(),
            _ => Vec::new(),
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            DslError::YamlError(_) => "ERR_DSL_YAML_PARSE",
            DslError::ValidationError(err) => err.code,
            DslError::MultipleValidationErrors(_) => "ERR_DSL_VALIDATION_MULTIPLE",
            DslError::UnsupportedVersion(_) => "ERR_DSL_UNSUPPORTED_VERSION",
            DslError::IoError { .. } => "ERR_DSL_IO",
            DslError::RegistryError(_) => "ERR_DSL_REGISTRY",
            DslError::InternalError(_) => "ERR_DSL_INTERNAL",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::error_codes;

    fn error(code: &'static str, message: &str) -> ValidationError {
        ValidationError {
            code,
            message: message.to_string(),
            path: None,
        }
    }

    #[test]
    fn test_from_validation_errors() {
        assert_eq!(
            DslError::from_validation_errors(Vec::new()).error_code(),
            "ERR_DSL_INTERNAL"
        );

        let single = DslError::from_validation_errors(vec![error(error_codes::DUPLICATE_ID, "dup")]);
        assert_eq!(single.error_code(), error_codes::DUPLICATE_ID);
        assert_eq!(single.validation_errors().len(), 1);

        let multiple = DslError::from_validation_errors(vec![
            error(error_codes::DUPLICATE_ID, "dup"),
            error(error_codes::INVALID_REFERENCE, "missing"),
        ]);
        assert_eq!(multiple.error_code(), "ERR_DSL_VALIDATION_MULTIPLE");
        let text = multiple.to_string();
        assert!(text.starts_with("Multiple validation errors (2 issues):"));
        assert!(text.contains("2. ERR_DSL_VALIDATION_INVALID_REFERENCE: missing"));
    }

    #[test]
    fn test_registry_error_code() {
        let err: DslError = CoreError::DuplicateFlow("signup".to_string()).into();
        assert_eq!(err.error_code(), "ERR_DSL_REGISTRY");
        assert!(err.validation_errors().is_empty());
    }
}
