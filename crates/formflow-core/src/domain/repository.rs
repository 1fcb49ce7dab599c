//! Repository traits for Formflow
//!
//! The engine never talks to storage directly. Hosts implement
//! [`SubmissionRepository`] for their persistence layer; an in-memory
//! implementation lives in `formflow-state-inmemory`.

use async_trait::async_trait;

use super::flow_definition::FlowId;
use super::submission::{FormSubmission, SessionId};
use crate::CoreError;

/// Repository for form submissions, keyed by session
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    /// Find the submission of a session
    async fn find_by_session(&self, session_id: &SessionId) -> Result<Option<FormSubmission>, CoreError>;

    /// Store a new submission.
    ///
    /// Fails with `DuplicateSubmission` if the session already has one.
    async fn create(&self, submission: &FormSubmission) -> Result<(), CoreError>;

    /// Replace a stored submission if its `lock_version` still matches.
    ///
    /// The comparison and the write happen atomically. On success the stored
    /// version is incremented and returned. Fails with `StaleSubmission` when
    /// the stored version differs and `SubmissionNotFound` when nothing is
    /// stored for the session.
    async fn update(&self, submission: &FormSubmission) -> Result<u64, CoreError>;

    /// All submissions of a flow
    async fn list_for_flow(&self, flow_id: &FlowId) -> Result<Vec<FormSubmission>, CoreError>;
}
