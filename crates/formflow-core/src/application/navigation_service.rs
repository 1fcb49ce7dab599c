use crate::{
    domain::flow_definition::StepId,
    domain::registry::FlowRegistry,
    domain::transition::NextStep,
    domain::validation::ValidationResult,
    types::{StepValues, SubmissionData},
    CoreError,
};
use std::sync::Arc;

/// Stateless queries over a frozen registry
#[derive(Debug, Clone)]
pub struct FlowNavigator {
    registry: Arc<FlowRegistry>,
}

impl FlowNavigator {
    /// Create a navigator over a registry
    pub fn new(registry: Arc<FlowRegistry>) -> Self {
        Self { registry }
    }

    /// The registry being navigated
    pub fn registry(&self) -> &Arc<FlowRegistry> {
        &self.registry
    }

    /// Compute where a submission goes after `current_step`
    pub fn compute_next_step(
        &self,
        flow_name: &str,
        current_step: &str,
        data: &SubmissionData,
    ) -> Result<NextStep, CoreError> {
        let flow = self.registry.lookup_flow(flow_name)?;
        let next = flow.next_step(current_step, data)?;

        tracing::debug!(
            flow_id = %flow_name,
            step_id = %current_step,
            next = %next,
            "Next step computed"
        );

        Ok(next)
    }

    /// Run the validator of a step.
    ///
    /// A validator that fails to run produces a result with
    /// `success == false`; its error is never propagated.
    pub fn validate_step(
        &self,
        flow_name: &str,
        step_id: &str,
        input: &StepValues,
    ) -> Result<ValidationResult, CoreError> {
        let flow = self.registry.lookup_flow(flow_name)?;
        if !flow.contains_step(step_id) {
            return Err(CoreError::StepNotFound(format!(
                "{} is not a step of flow {}",
                step_id, flow_name
            )));
        }

        let Some(validator) = flow.validator(step_id) else {
            return Ok(ValidationResult::ok());
        };

        match validator.validate(&StepId::from(step_id), input) {
            Ok(result) => Ok(result),
            Err(e) => {
                tracing::warn!(
                    flow_id = %flow_name,
                    step_id = %step_id,
                    error = %e,
                    "Step validator failed to run"
                );
                Ok(ValidationResult::execution_failed(e.to_string()))
            }
        }
    }
}
