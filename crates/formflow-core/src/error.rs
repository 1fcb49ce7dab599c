use thiserror::Error;

/// Core error type for the Formflow engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A flow with the same name is already registered
    #[error("Flow already registered: {0}")]
    DuplicateFlow(String),

    /// Flow definition not found
    #[error("Flow definition not found: {0}")]
    FlowNotFound(String),

    /// Step not found in the flow
    #[error("Step not found: {0}")]
    StepNotFound(String),

    /// Submission not found for a session
    #[error("Submission not found: {0}")]
    SubmissionNotFound(String),

    /// Malformed step list or transition referencing an unknown step
    #[error("Invalid step: {0}")]
    InvalidStep(String),

    /// A validation rule itself failed to run
    #[error("Validation execution error: {0}")]
    ValidationExecution(String),

    /// The submission already reached the terminal step
    #[error("Submission already completed: {0}")]
    SubmissionCompleted(String),

    /// The submission has not reached the terminal step yet
    #[error("Submission not completed: {0}")]
    SubmissionNotCompleted(String),

    /// The submitted step is not the step the submission is on
    #[error("Step submitted out of order: {0}")]
    StepOutOfOrder(String),

    /// The session's submission belongs to another flow
    #[error("Submission flow mismatch: {0}")]
    SubmissionFlowMismatch(String),

    /// A submission already exists for the session
    #[error("Duplicate submission: {0}")]
    DuplicateSubmission(String),

    /// The stored submission changed since it was read
    #[error("Stale submission: {0}")]
    StaleSubmission(String),

    /// State store error
    #[error("State store error: {0}")]
    StateStoreError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Coarse classification of [`CoreError`] used at the request boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Registering an already-used flow name
    DuplicateFlow,
    /// Unknown flow, step or submission
    NotFound,
    /// Malformed definition or a step that cannot be submitted
    InvalidStep,
    /// A validation rule failed to execute
    ValidationExecution,
    /// Concurrent or state conflicts on a submission
    Conflict,
    /// Storage, serialization and everything else
    Internal,
}

impl CoreError {
    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::DuplicateFlow(_) => ErrorKind::DuplicateFlow,
            CoreError::FlowNotFound(_)
            | CoreError::StepNotFound(_)
            | CoreError::SubmissionNotFound(_) => ErrorKind::NotFound,
            CoreError::InvalidStep(_)
            | CoreError::StepOutOfOrder(_)
            | CoreError::SubmissionFlowMismatch(_)
            | CoreError::SubmissionNotCompleted(_) => ErrorKind::InvalidStep,
            CoreError::ValidationExecution(_) => ErrorKind::ValidationExecution,
            CoreError::SubmissionCompleted(_)
            | CoreError::DuplicateSubmission(_)
            | CoreError::StaleSubmission(_) => ErrorKind::Conflict,
            CoreError::StateStoreError(_)
            | CoreError::SerializationError(_)
            | CoreError::ConfigurationError(_)
            | CoreError::Other(_) => ErrorKind::Internal,
        }
    }

    /// Whether the error means "no such flow, step or submission"
    #[inline]
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// HTTP-style status code a host should answer with
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::NotFound => 404,
            ErrorKind::InvalidStep => 400,
            ErrorKind::Conflict => 409,
            ErrorKind::DuplicateFlow | ErrorKind::ValidationExecution | ErrorKind::Internal => 500,
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::SerializationError(err.to_string())
    }
}

impl From<String> for CoreError {
    fn from(err: String) -> Self {
        CoreError::Other(err)
    }
}

impl From<&str> for CoreError {
    fn from(err: &str) -> Self {
        CoreError::Other(err.to_string())
    }
}
