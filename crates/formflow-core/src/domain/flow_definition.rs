use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use super::transition::{NextStep, Predicate, TransitionRule};
use super::validation::StepValidator;
use crate::types::SubmissionData;
use crate::CoreError;

/// Value object: Flow ID (the flow's unique name)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FlowId(pub String);

/// Value object: Step ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StepId(pub String);

impl fmt::Display for FlowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FlowId {
    fn from(s: &str) -> Self {
        FlowId(s.to_string())
    }
}

impl From<String> for FlowId {
    fn from(s: String) -> Self {
        FlowId(s)
    }
}

impl From<&str> for StepId {
    fn from(s: &str) -> Self {
        StepId(s.to_string())
    }
}

impl From<String> for StepId {
    fn from(s: String) -> Self {
        StepId(s)
    }
}

impl From<&StepId> for StepId {
    fn from(s: &StepId) -> Self {
        s.clone()
    }
}

impl StepId {
    /// Borrow the raw identifier
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FlowId {
    /// Borrow the raw identifier
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A named, ordered collection of steps plus conditional transitions.
///
/// Only constructed through [`FlowDefinition::new`] or
/// [`FlowDefinitionBuilder::build`], both of which validate the step list,
/// so a definition always has at least one step.
#[derive(Clone)]
pub struct FlowDefinition {
    id: FlowId,
    description: Option<String>,
    steps: Vec<StepId>,
    transitions: Vec<TransitionRule>,
    validators: HashMap<StepId, Arc<dyn StepValidator>>,
}

impl fmt::Debug for FlowDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut validated: Vec<&str> = self.validators.keys().map(StepId::as_str).collect();
        validated.sort_unstable();
        f.debug_struct("FlowDefinition")
            .field("id", &self.id)
            .field("description", &self.description)
            .field("steps", &self.steps)
            .field("transitions", &self.transitions)
            .field("validated_steps", &validated)
            .finish()
    }
}

impl FlowDefinition {
    /// Create a flow with the given steps and no transitions
    pub fn new<I, S>(id: impl Into<FlowId>, steps: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<StepId>,
    {
        let definition = Self {
            id: id.into(),
            description: None,
            steps: steps.into_iter().map(Into::into).collect(),
            transitions: Vec::new(),
            validators: HashMap::new(),
        };
        definition.validate()?;
        Ok(definition)
    }

    /// Start building a flow
    pub fn builder(id: impl Into<FlowId>) -> FlowDefinitionBuilder {
        FlowDefinitionBuilder::new(id)
    }

    /// Flow name
    #[inline]
    pub fn id(&self) -> &FlowId {
        &self.id
    }

    /// Optional description
    #[inline]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Steps in default navigation order
    #[inline]
    pub fn steps(&self) -> &[StepId] {
        &self.steps
    }

    /// All transition rules in registration order
    #[inline]
    pub fn transitions(&self) -> &[TransitionRule] {
        &self.transitions
    }

    /// First step of the flow
    #[inline]
    pub fn first_step(&self) -> &StepId {
        &self.steps[0]
    }

    /// Last step of the flow
    #[inline]
    pub fn last_step(&self) -> &StepId {
        &self.steps[self.steps.len() - 1]
    }

    /// Index of a step in the default order
    #[inline]
    pub fn position(&self, step_id: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.0 == step_id)
    }

    /// Whether the step belongs to this flow
    #[inline]
    pub fn contains_step(&self, step_id: &str) -> bool {
        self.position(step_id).is_some()
    }

    /// Rules leaving `step_id`, in registration order
    pub fn transitions_from<'a>(&'a self, step_id: &'a str) -> impl Iterator<Item = &'a TransitionRule> + 'a {
        self.transitions.iter().filter(move |rule| rule.from.0 == step_id)
    }

    /// Validator attached to a step, if any
    #[inline]
    pub fn validator(&self, step_id: &str) -> Option<&Arc<dyn StepValidator>> {
        self.validators.get(&StepId(step_id.to_string()))
    }

    /// Append a conditional rule
    pub fn add_transition(
        &mut self,
        from: impl Into<StepId>,
        predicate: Predicate,
        to: impl Into<NextStep>,
    ) -> Result<(), CoreError> {
        let rule = TransitionRule::new(from, predicate, to);
        self.check_rule(&rule)?;
        self.transitions.push(rule);
        Ok(())
    }

    /// Attach (or replace) the validator of a step
    pub fn set_validator(
        &mut self,
        step_id: impl Into<StepId>,
        validator: Arc<dyn StepValidator>,
    ) -> Result<(), CoreError> {
        let step_id = step_id.into();
        if !self.contains_step(&step_id.0) {
            return Err(CoreError::InvalidStep(format!(
                "Flow {} has no step {} to attach a validator to",
                self.id, step_id
            )));
        }
        self.validators.insert(step_id, validator);
        Ok(())
    }

    /// Check that a target refers to a step of this flow or the terminal sentinel
    pub fn check_target(&self, target: &NextStep) -> Result<(), CoreError> {
        match target {
            NextStep::Complete => Ok(()),
            NextStep::Step(id) if self.contains_step(&id.0) => Ok(()),
            NextStep::Step(id) => Err(CoreError::StepNotFound(format!(
                "{} is not a step of flow {}",
                id, self.id
            ))),
        }
    }

    /// Validate the flow definition
    pub fn validate(&self) -> Result<(), CoreError> {
        // Check for empty steps
        if self.steps.is_empty() {
            return Err(CoreError::InvalidStep(format!(
                "Flow {} must have at least one step",
                self.id
            )));
        }

        // Check for ID uniqueness and reserved spellings
        let mut step_ids = HashSet::with_capacity(self.steps.len());
        for step in &self.steps {
            if step.0.trim().is_empty() || step.0.starts_with('$') {
                return Err(CoreError::InvalidStep(format!(
                    "Flow {} has an invalid step ID: '{}'",
                    self.id, step
                )));
            }
            if !step_ids.insert(step.0.as_str()) {
                return Err(CoreError::InvalidStep(format!(
                    "Flow {} has a duplicate step ID: {}",
                    self.id, step
                )));
            }
        }

        for rule in &self.transitions {
            self.check_rule(rule)?;
        }

        for step in self.validators.keys() {
            if !step_ids.contains(step.0.as_str()) {
                return Err(CoreError::InvalidStep(format!(
                    "Flow {} has a validator for unknown step {}",
                    self.id, step
                )));
            }
        }

        Ok(())
    }

    fn check_rule(&self, rule: &TransitionRule) -> Result<(), CoreError> {
        if !self.contains_step(&rule.from.0) {
            return Err(CoreError::InvalidStep(format!(
                "Transition in flow {} starts from unknown step {}",
                self.id, rule.from
            )));
        }
        if let NextStep::Step(to) = &rule.to {
            if !self.contains_step(&to.0) {
                return Err(CoreError::InvalidStep(format!(
                    "Transition in flow {} from {} targets unknown step {}",
                    self.id, rule.from, to
                )));
            }
        }
        Ok(())
    }

    /// Compute where a submission goes after `current`.
    ///
    /// Rules leaving `current` are tried in registration order and the first
    /// matching predicate wins. Without a match the next step in `steps` is
    /// returned, or [`NextStep::Complete`] after the last step.
    pub fn next_step(&self, current: &str, data: &SubmissionData) -> Result<NextStep, CoreError> {
        let index = self.position(current).ok_or_else(|| {
            CoreError::StepNotFound(format!("{} is not a step of flow {}", current, self.id))
        })?;

        if let Some(rule) = self.transitions_from(current).find(|rule| rule.predicate.evaluate(data)) {
            tracing::debug!(
                flow_id = %self.id,
                step_id = %current,
                next = %rule.to,
                "Transition rule matched"
            );
            return Ok(rule.to.clone());
        }

        Ok(match self.steps.get(index + 1) {
            Some(next) => NextStep::Step(next.clone()),
            None => NextStep::Complete,
        })
    }
}

/// Fluent builder for [`FlowDefinition`]
pub struct FlowDefinitionBuilder {
    id: FlowId,
    description: Option<String>,
    steps: Vec<StepId>,
    transitions: Vec<TransitionRule>,
    validators: HashMap<StepId, Arc<dyn StepValidator>>,
}

impl FlowDefinitionBuilder {
    /// Create an empty builder
    pub fn new(id: impl Into<FlowId>) -> Self {
        Self {
            id: id.into(),
            description: None,
            steps: Vec::new(),
            transitions: Vec::new(),
            validators: HashMap::new(),
        }
    }

    /// Set the description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append a step
    pub fn step(mut self, step_id: impl Into<StepId>) -> Self {
        self.steps.push(step_id.into());
        self
    }

    /// Append several steps
    pub fn steps<I, S>(mut self, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<StepId>,
    {
        self.steps.extend(steps.into_iter().map(Into::into));
        self
    }

    /// Append a conditional rule
    pub fn transition(
        mut self,
        from: impl Into<StepId>,
        predicate: Predicate,
        to: impl Into<NextStep>,
    ) -> Self {
        self.transitions.push(TransitionRule::new(from, predicate, to));
        self
    }

    /// Attach a validator to a step
    pub fn validator<V>(mut self, step_id: impl Into<StepId>, validator: V) -> Self
    where
        V: StepValidator + 'static,
    {
        self.validators.insert(step_id.into(), Arc::new(validator));
        self
    }

    /// Validate and produce the definition
    pub fn build(self) -> Result<FlowDefinition, CoreError> {
        let definition = FlowDefinition {
            id: self.id,
            description: self.description,
            steps: self.steps,
            transitions: self.transitions,
            validators: self.validators,
        };
        definition.validate()?;
        Ok(definition)
    }
}
