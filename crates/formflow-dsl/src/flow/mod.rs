mod step;
mod transition;

pub use step::StepDocument;
pub use transition::TransitionDocument;

use formflow_core::{CoreError, FlowDefinition, Predicate, RuleSetValidator};
use serde::{Deserialize, Serialize};

/// The complete Formflow DSL document.
/// This is the top-level structure of a flow file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedDocument {
    /// The DSL version (e.g., "1.0")
    pub dsl_version: String,

    /// Flow definitions
    #[serde(default)]
    pub flows: Vec<FlowDocument>,
}

/// A flow as written in a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowDocument {
    /// Unique name of the flow
    pub name: String,

    /// Optional human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Steps in default navigation order
    #[serde(default)]
    pub steps: Vec<StepDocument>,

    /// Conditional transitions, evaluated in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transitions: Vec<TransitionDocument>,
}

impl FlowDocument {
    /// Step ids in document order
    pub fn step_ids(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|step| step.id.as_str())
    }

    /// Convert into an engine definition
    pub fn to_definition(&self) -> Result<FlowDefinition, CoreError> {
        let mut builder = FlowDefinition::builder(self.name.as_str()).steps(self.step_ids());

        if let Some(description) = &self.description {
            builder = builder.description(description.as_str());
        }

        for transition in &self.transitions {
            let predicate = transition.when.clone().unwrap_or(Predicate::Always);
            builder = builder.transition(transition.from.as_str(), predicate, transition.to.clone());
        }

        for step in self.steps.iter().filter(|step| !step.validations.is_empty()) {
            builder = builder.validator(
                step.id.as_str(),
                RuleSetValidator::new(step.validations.clone()),
            );
        }

        builder.build()
    }
}
