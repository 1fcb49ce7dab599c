//! In-memory submission store for Formflow
//!
//! This crate provides an in-memory implementation of the
//! [`SubmissionRepository`] interface defined in formflow-core. It is useful
//! for development, testing, and single-process deployments where
//! submissions do not need to survive a restart.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use formflow_core::{domain::repository::SubmissionRepository, FormSubmission};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

pub mod repositories;
pub use repositories::InMemorySubmissionRepository;

/// Provider for in-memory repositories sharing one backing map
pub struct InMemoryStateStoreProvider {
    // Submissions keyed by session ID
    submissions: Arc<RwLock<HashMap<String, FormSubmission>>>,
}

impl InMemoryStateStoreProvider {
    /// Create a new in-memory state store provider
    pub fn new() -> Self {
        Self {
            submissions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a repository backed by the shared map
    pub fn create_repository(&self) -> Arc<dyn SubmissionRepository> {
        Arc::new(InMemorySubmissionRepository::new(self.submissions.clone()))
    }

    /// Number of stored submissions
    pub async fn submission_count(&self) -> usize {
        self.submissions.read().await.len()
    }
}

impl Default for InMemoryStateStoreProvider {
    fn default() -> Self {
        Self::new()
    }
}
