use crate::{
    config::StepDataMerge,
    domain::{
        events::SubmissionEvent,
        flow_definition::{FlowDefinition, FlowId, StepId},
        transition::NextStep,
    },
    types::{StepValues, SubmissionData},
    CoreError,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Value object: Submission ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionId(pub String);

/// Value object: Session ID (the end user's session key)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SubmissionId {
    /// Generate a fresh random ID
    pub fn generate() -> Self {
        SubmissionId(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        SessionId(s.to_string())
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        SessionId(s)
    }
}

/// Where a submission stands in its flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "step", rename_all = "snake_case")]
pub enum SubmissionStatus {
    /// Created but not placed on a step yet
    NotStarted,

    /// Waiting for input on a step
    OnStep(StepId),

    /// Terminal step reached
    Completed,
}

/// Aggregate: a session's progress through one flow
#[derive(Debug, Serialize, Deserialize)]
pub struct FormSubmission {
    /// Unique identifier
    pub id: SubmissionId,

    /// Owning session
    pub session_id: SessionId,

    /// Flow being filled in
    pub flow_id: FlowId,

    /// Accumulated answers keyed by step
    pub data: SubmissionData,

    /// Step waiting for input; `None` before the flow starts and once completed
    pub current_step: Option<StepId>,

    /// Whether the terminal step was reached
    pub completed: bool,

    /// Optimistic-lock counter maintained by repositories
    pub lock_version: u64,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last updated timestamp
    pub updated_at: DateTime<Utc>,

    /// Domain events
    #[serde(skip)]
    pub events: Vec<SubmissionEvent>,
}

// Domain events are not carried over to clones
impl Clone for FormSubmission {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            session_id: self.session_id.clone(),
            flow_id: self.flow_id.clone(),
            data: self.data.clone(),
            current_step: self.current_step.clone(),
            completed: self.completed,
            lock_version: self.lock_version,
            created_at: self.created_at,
            updated_at: self.updated_at,
            events: Vec::new(),
        }
    }
}

impl FormSubmission {
    /// Create a submission that has not started yet
    pub fn new(session_id: SessionId, flow_id: FlowId) -> Self {
        let now = Utc::now();
        Self {
            id: SubmissionId::generate(),
            session_id,
            flow_id,
            data: SubmissionData::new(),
            current_step: None,
            completed: false,
            lock_version: 0,
            created_at: now,
            updated_at: now,
            events: Vec::with_capacity(4),
        }
    }

    /// Derived status
    pub fn status(&self) -> SubmissionStatus {
        match (&self.current_step, self.completed) {
            (_, true) => SubmissionStatus::Completed,
            (Some(step), false) => SubmissionStatus::OnStep(step.clone()),
            (None, false) => SubmissionStatus::NotStarted,
        }
    }

    /// Place the submission on the first step of its flow
    pub fn start(&mut self, first_step: StepId) -> Result<(), CoreError> {
        if self.status() != SubmissionStatus::NotStarted {
            return Err(CoreError::InvalidStep(format!(
                "Cannot start submission {} in state: {:?}",
                self.id,
                self.status()
            )));
        }

        self.current_step = Some(first_step.clone());
        self.update_timestamp();

        self.record_event(SubmissionEvent::Started {
            submission_id: self.id.clone(),
            session_id: self.session_id.clone(),
            flow_id: self.flow_id.clone(),
            first_step,
            timestamp: Utc::now(),
        });

        Ok(())
    }

    /// Check the record against the flow it claims to belong to
    pub fn check_against(&self, flow: &FlowDefinition) -> Result<(), CoreError> {
        if &self.flow_id != flow.id() {
            return Err(CoreError::SubmissionFlowMismatch(format!(
                "Submission {} belongs to flow {}, not {}",
                self.id,
                self.flow_id,
                flow.id()
            )));
        }
        if let Some(step) = &self.current_step {
            if !flow.contains_step(step.as_str()) {
                return Err(CoreError::StepNotFound(format!(
                    "Submission {} is on step {} which flow {} does not define",
                    self.id,
                    step,
                    flow.id()
                )));
            }
        }
        Ok(())
    }

    /// Check that `step_id` may be submitted now
    pub fn ensure_accepts(&self, step_id: &StepId, enforce_current_step: bool) -> Result<(), CoreError> {
        match self.status() {
            SubmissionStatus::Completed => Err(CoreError::SubmissionCompleted(format!(
                "Submission {} for flow {} is already completed",
                self.id, self.flow_id
            ))),
            SubmissionStatus::NotStarted => Err(CoreError::InvalidStep(format!(
                "Submission {} has not started",
                self.id
            ))),
            SubmissionStatus::OnStep(current) if enforce_current_step && &current != step_id => {
                Err(CoreError::StepOutOfOrder(format!(
                    "Submission {} is on step {}, got {}",
                    self.id, current, step_id
                )))
            }
            SubmissionStatus::OnStep(_) => Ok(()),
        }
    }

    /// Store accepted input and move to `next`
    pub fn accept_step(
        &mut self,
        step_id: StepId,
        input: StepValues,
        merge: StepDataMerge,
        next: NextStep,
    ) -> Result<(), CoreError> {
        if self.completed {
            return Err(CoreError::SubmissionCompleted(format!(
                "Submission {} is already completed",
                self.id
            )));
        }

        merge.apply(&mut self.data, step_id.as_str(), input);

        let now = Utc::now();
        match &next {
            NextStep::Step(to) => self.current_step = Some(to.clone()),
            NextStep::Complete => {
                self.current_step = None;
                self.completed = true;
            }
        }
        self.update_timestamp();

        self.record_event(SubmissionEvent::StepAccepted {
            submission_id: self.id.clone(),
            step_id,
            next: next.clone(),
            timestamp: now,
        });
        if next.is_complete() {
            self.record_event(SubmissionEvent::Completed {
                submission_id: self.id.clone(),
                flow_id: self.flow_id.clone(),
                timestamp: now,
            });
        }

        Ok(())
    }

    /// Record a rejected step; the submission itself is left untouched
    pub fn reject_step(&mut self, step_id: StepId, errors: Vec<String>) {
        self.record_event(SubmissionEvent::StepRejected {
            submission_id: self.id.clone(),
            step_id,
            errors,
            timestamp: Utc::now(),
        });
    }

    /// Update the timestamp
    #[inline]
    pub fn update_timestamp(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Record a domain event
    #[inline]
    pub fn record_event(&mut self, event: SubmissionEvent) {
        self.events.push(event);
    }

    /// Take all recorded events
    pub fn take_events(&mut self) -> Vec<SubmissionEvent> {
        std::mem::take(&mut self.events)
    }
}
