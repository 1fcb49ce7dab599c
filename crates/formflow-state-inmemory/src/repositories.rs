use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use formflow_core::{
    domain::repository::SubmissionRepository, CoreError, FlowId, FormSubmission, SessionId,
};

/// In-memory implementation of the SubmissionRepository
pub struct InMemorySubmissionRepository {
    submissions: Arc<RwLock<HashMap<String, FormSubmission>>>,
}

impl InMemorySubmissionRepository {
    /// Create a repository over a shared map keyed by session ID
    pub fn new(submissions: Arc<RwLock<HashMap<String, FormSubmission>>>) -> Self {
        Self { submissions }
    }
}

impl Default for InMemorySubmissionRepository {
    fn default() -> Self {
        Self::new(Arc::new(RwLock::new(HashMap::new())))
    }
}

#[async_trait]
impl SubmissionRepository for InMemorySubmissionRepository {
    async fn find_by_session(&self, session_id: &SessionId) -> Result<Option<FormSubmission>, CoreError> {
        let submissions = self.submissions.read().await;
        Ok(submissions.get(&session_id.0).cloned())
    }

    async fn create(&self, submission: &FormSubmission) -> Result<(), CoreError> {
        let mut submissions = self.submissions.write().await;
        if submissions.contains_key(&submission.session_id.0) {
            return Err(CoreError::DuplicateSubmission(submission.session_id.to_string()));
        }

        submissions.insert(submission.session_id.0.clone(), submission.clone());
        debug!(
            session_id = %submission.session_id,
            flow_id = %submission.flow_id,
            "Submission stored"
        );
        Ok(())
    }

    async fn update(&self, submission: &FormSubmission) -> Result<u64, CoreError> {
        // Compare and write under one write guard
        let mut submissions = self.submissions.write().await;
        let stored = submissions
            .get_mut(&submission.session_id.0)
            .ok_or_else(|| CoreError::SubmissionNotFound(submission.session_id.to_string()))?;

        if stored.lock_version != submission.lock_version {
            return Err(CoreError::StaleSubmission(format!(
                "{} (expected version {}, stored version {})",
                submission.session_id, submission.lock_version, stored.lock_version
            )));
        }

        let mut updated = submission.clone();
        updated.lock_version = stored.lock_version + 1;
        let version = updated.lock_version;
        *stored = updated;

        debug!(
            session_id = %submission.session_id,
            lock_version = version,
            "Submission updated"
        );
        Ok(version)
    }

    async fn list_for_flow(&self, flow_id: &FlowId) -> Result<Vec<FormSubmission>, CoreError> {
        let submissions = self.submissions.read().await;

        let mut matching: Vec<FormSubmission> = submissions
            .values()
            .filter(|submission| &submission.flow_id == flow_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        Ok(matching)
    }
}
