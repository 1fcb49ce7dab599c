use crate::domain::flow_definition::{FlowId, StepId};
use crate::domain::submission::{SessionId, SubmissionId};
use crate::domain::transition::NextStep;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Events recorded on a submission while it moves through its flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SubmissionEvent {
    /// Submission created and placed on the first step
    Started {
        /// Submission
        submission_id: SubmissionId,
        /// Owning session
        session_id: SessionId,
        /// Flow being filled in
        flow_id: FlowId,
        /// First step
        first_step: StepId,
        /// When it happened
        timestamp: DateTime<Utc>,
    },

    /// A step was accepted and the submission moved on
    StepAccepted {
        /// Submission
        submission_id: SubmissionId,
        /// Step that was submitted
        step_id: StepId,
        /// Where the submission went
        next: NextStep,
        /// When it happened
        timestamp: DateTime<Utc>,
    },

    /// A step failed validation; the submission stayed where it was
    StepRejected {
        /// Submission
        submission_id: SubmissionId,
        /// Step that was submitted
        step_id: StepId,
        /// Validation messages
        errors: Vec<String>,
        /// When it happened
        timestamp: DateTime<Utc>,
    },

    /// The terminal step was reached
    Completed {
        /// Submission
        submission_id: SubmissionId,
        /// Flow that was completed
        flow_id: FlowId,
        /// When it happened
        timestamp: DateTime<Utc>,
    },
}

impl SubmissionEvent {
    /// Returns the type of the event as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            SubmissionEvent::Started { .. } => "submission.started",
            SubmissionEvent::StepAccepted { .. } => "submission.step_accepted",
            SubmissionEvent::StepRejected { .. } => "submission.step_rejected",
            SubmissionEvent::Completed { .. } => "submission.completed",
        }
    }

    /// Returns the submission this event belongs to
    pub fn submission_id(&self) -> &SubmissionId {
        match self {
            SubmissionEvent::Started { submission_id, .. }
            | SubmissionEvent::StepAccepted { submission_id, .. }
            | SubmissionEvent::StepRejected { submission_id, .. }
            | SubmissionEvent::Completed { submission_id, .. } => submission_id,
        }
    }

    /// Returns the timestamp when the event occurred
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            SubmissionEvent::Started { timestamp, .. }
            | SubmissionEvent::StepAccepted { timestamp, .. }
            | SubmissionEvent::StepRejected { timestamp, .. }
            | SubmissionEvent::Completed { timestamp, .. } => *timestamp,
        }
    }
}
