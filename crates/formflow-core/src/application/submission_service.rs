use crate::{
    application::navigation_service::FlowNavigator,
    config::ProgressionConfig,
    domain::events::SubmissionEvent,
    domain::flow_definition::StepId,
    domain::registry::FlowRegistry,
    domain::repository::SubmissionRepository,
    domain::submission::{FormSubmission, SessionId},
    domain::transition::NextStep,
    domain::validation::ValidationResult,
    types::StepValues,
    CoreError,
};
use serde::Serialize;
use std::sync::Arc;

/// What happened to a submission after a step was posted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "transition", rename_all = "snake_case")]
pub enum Transition {
    /// Moved from one step to another
    Advanced {
        /// Step that was submitted
        from: StepId,
        /// Step now waiting for input
        to: StepId,
    },
    /// Input was rejected; the submission did not move
    Stayed {
        /// Step that was re-rendered
        step: StepId,
    },
    /// The terminal step was reached
    Completed {
        /// Last submitted step
        from: StepId,
    },
}

/// Result of [`SubmissionService::submit_step`]
#[derive(Debug, Clone)]
pub struct StepOutcome {
    /// Submission as stored after the call
    pub submission: FormSubmission,

    /// Validation result of the posted input
    pub validation: ValidationResult,

    /// Movement of the submission
    pub transition: Transition,
}

impl StepOutcome {
    /// Whether the submission moved forward
    pub fn advanced(&self) -> bool {
        !matches!(self.transition, Transition::Stayed { .. })
    }
}

/// Drives submissions through their flows
pub struct SubmissionService {
    navigator: FlowNavigator,
    repository: Arc<dyn SubmissionRepository>,
    config: ProgressionConfig,
}

impl SubmissionService {
    /// Create a new submission service
    pub fn new(
        registry: Arc<FlowRegistry>,
        repository: Arc<dyn SubmissionRepository>,
        config: ProgressionConfig,
    ) -> Self {
        Self {
            navigator: FlowNavigator::new(registry),
            repository,
            config,
        }
    }

    /// Navigator over the same registry
    pub fn navigator(&self) -> &FlowNavigator {
        &self.navigator
    }

    /// Active configuration
    pub fn config(&self) -> &ProgressionConfig {
        &self.config
    }

    /// Find the session's submission, creating it on the first step if needed
    pub async fn show(&self, session_id: &SessionId, flow_name: &str) -> Result<FormSubmission, CoreError> {
        let flow = self.navigator.registry().lookup_flow(flow_name)?;

        if let Some(existing) = self.repository.find_by_session(session_id).await? {
            existing.check_against(&flow)?;
            return Ok(existing);
        }

        let mut submission = FormSubmission::new(session_id.clone(), flow.id().clone());
        submission.start(flow.first_step().clone())?;

        match self.repository.create(&submission).await {
            Ok(()) => {}
            // Another request created it first
            Err(CoreError::DuplicateSubmission(_)) => {
                let existing = self
                    .repository
                    .find_by_session(session_id)
                    .await?
                    .ok_or_else(|| CoreError::SubmissionNotFound(session_id.to_string()))?;
                existing.check_against(&flow)?;
                return Ok(existing);
            }
            Err(e) => return Err(e),
        }

        self.publish_events(&mut submission);
        Ok(submission)
    }

    /// Post the input of one step
    pub async fn submit_step(
        &self,
        session_id: &SessionId,
        flow_name: &str,
        step_id: &str,
        input: StepValues,
    ) -> Result<StepOutcome, CoreError> {
        let flow = self.navigator.registry().lookup_flow(flow_name)?;
        if !flow.contains_step(step_id) {
            return Err(CoreError::StepNotFound(format!(
                "{} is not a step of flow {}",
                step_id, flow_name
            )));
        }
        let step = StepId::from(step_id);

        let mut submission = self.show(session_id, flow_name).await?;
        if let Err(e) = submission.ensure_accepts(&step, self.config.enforce_current_step) {
            tracing::warn!(
                flow_id = %flow_name,
                step_id = %step_id,
                session_id = %session_id,
                error = %e,
                "Step submission refused"
            );
            return Err(e);
        }

        let validation = self.navigator.validate_step(flow_name, step_id, &input)?;
        if !validation.is_valid() {
            submission.reject_step(step.clone(), validation.errors().to_vec());
            self.publish_events(&mut submission);
            return Ok(StepOutcome {
                submission,
                validation,
                transition: Transition::Stayed { step },
            });
        }

        let next = match validation.next_step() {
            Some(target) => {
                flow.check_target(target)?;
                target.clone()
            }
            None => {
                let mut preview = submission.data.clone();
                self.config
                    .step_data_merge
                    .apply(&mut preview, step_id, input.clone());
                flow.next_step(step_id, &preview)?
            }
        };

        submission.accept_step(step.clone(), input, self.config.step_data_merge, next.clone())?;
        submission.lock_version = self.repository.update(&submission).await?;
        self.publish_events(&mut submission);

        let transition = match next {
            NextStep::Step(to) => Transition::Advanced { from: step, to },
            NextStep::Complete => Transition::Completed { from: step },
        };

        Ok(StepOutcome {
            submission,
            validation,
            transition,
        })
    }

    /// The completed submission of a session
    pub async fn completion(&self, session_id: &SessionId) -> Result<FormSubmission, CoreError> {
        let submission = self
            .repository
            .find_by_session(session_id)
            .await?
            .ok_or_else(|| CoreError::SubmissionNotFound(session_id.to_string()))?;

        if !submission.completed {
            return Err(CoreError::SubmissionNotCompleted(format!(
                "Submission {} for flow {} is still on step {}",
                submission.id,
                submission.flow_id,
                submission
                    .current_step
                    .as_ref()
                    .map_or("-", StepId::as_str)
            )));
        }

        Ok(submission)
    }

    /// All submissions of a flow
    pub async fn list_submissions(&self, flow_name: &str) -> Result<Vec<FormSubmission>, CoreError> {
        let flow = self.navigator.registry().lookup_flow(flow_name)?;
        self.repository.list_for_flow(flow.id()).await
    }

    fn publish_events(&self, submission: &mut FormSubmission) {
        for event in submission.take_events() {
            match &event {
                SubmissionEvent::Started {
                    session_id,
                    flow_id,
                    first_step,
                    ..
                } => tracing::info!(
                    flow_id = %flow_id,
                    session_id = %session_id,
                    step_id = %first_step,
                    "Submission started"
                ),
                SubmissionEvent::StepAccepted { step_id, next, .. } => tracing::debug!(
                    flow_id = %submission.flow_id,
                    session_id = %submission.session_id,
                    step_id = %step_id,
                    next = %next,
                    "Step accepted"
                ),
                SubmissionEvent::StepRejected { step_id, errors, .. } => tracing::debug!(
                    flow_id = %submission.flow_id,
                    session_id = %submission.session_id,
                    step_id = %step_id,
                    errors = errors.len(),
                    "Step rejected"
                ),
                SubmissionEvent::Completed { flow_id, .. } => tracing::info!(
                    flow_id = %flow_id,
                    session_id = %submission.session_id,
                    submission_id = %event.submission_id(),
                    "Submission completed"
                ),
            }
        }
    }
}
