//! Flow registry.
//!
//! Flows are registered on a [`FlowRegistryBuilder`] during start-up and then
//! frozen into a [`FlowRegistry`]. The frozen registry is immutable, so it can
//! be shared between request handlers through an `Arc` without locking.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::flow_definition::{FlowDefinition, FlowId, StepId};
use super::transition::{NextStep, Predicate};
use crate::CoreError;

/// Mutable registry used while flows are being declared
#[derive(Debug, Default)]
pub struct FlowRegistryBuilder {
    flows: BTreeMap<FlowId, FlowDefinition>,
}

impl FlowRegistryBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a flow from its name, steps and transition rules
    pub fn define_flow<I, S, T>(
        &mut self,
        name: impl Into<FlowId>,
        steps: I,
        transitions: T,
    ) -> Result<&mut Self, CoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<StepId>,
        T: IntoIterator<Item = (StepId, Predicate, NextStep)>,
    {
        let mut definition = FlowDefinition::new(name, steps)?;
        for (from, predicate, to) in transitions {
            definition.add_transition(from, predicate, to)?;
        }
        self.register(definition)
    }

    /// Register a fully built definition
    pub fn register(&mut self, definition: FlowDefinition) -> Result<&mut Self, CoreError> {
        if self.flows.contains_key(definition.id()) {
            return Err(CoreError::DuplicateFlow(definition.id().to_string()));
        }

        definition.validate()?;

        tracing::info!(
            flow_id = %definition.id(),
            steps = definition.steps().len(),
            transitions = definition.transitions().len(),
            "Flow registered"
        );
        self.flows.insert(definition.id().clone(), definition);
        Ok(self)
    }

    /// Append a rule to an already declared flow
    pub fn add_transition(
        &mut self,
        flow: &str,
        from: impl Into<StepId>,
        predicate: Predicate,
        to: impl Into<NextStep>,
    ) -> Result<&mut Self, CoreError> {
        let definition = self
            .flows
            .get_mut(&FlowId(flow.to_string()))
            .ok_or_else(|| CoreError::FlowNotFound(flow.to_string()))?;
        definition.add_transition(from, predicate, to)?;
        Ok(self)
    }

    /// Whether a flow with this name was declared
    pub fn contains(&self, flow: &str) -> bool {
        self.flows.contains_key(&FlowId(flow.to_string()))
    }

    /// Freeze the registry
    pub fn build(self) -> FlowRegistry {
        FlowRegistry {
            flows: self
                .flows
                .into_iter()
                .map(|(id, definition)| (id, Arc::new(definition)))
                .collect(),
        }
    }
}

/// Immutable set of flow definitions
#[derive(Debug, Clone, Default)]
pub struct FlowRegistry {
    flows: BTreeMap<FlowId, Arc<FlowDefinition>>,
}

impl FlowRegistry {
    /// Start declaring flows
    pub fn builder() -> FlowRegistryBuilder {
        FlowRegistryBuilder::new()
    }

    /// Look up a flow by name
    pub fn lookup_flow(&self, name: &str) -> Result<Arc<FlowDefinition>, CoreError> {
        self.flows
            .get(&FlowId(name.to_string()))
            .cloned()
            .ok_or_else(|| CoreError::FlowNotFound(name.to_string()))
    }

    /// Registered flow names in lexical order
    pub fn flow_ids(&self) -> Vec<&FlowId> {
        self.flows.keys().collect()
    }

    /// Whether a flow is registered
    pub fn contains(&self, name: &str) -> bool {
        self.flows.contains_key(&FlowId(name.to_string()))
    }

    /// Number of registered flows
    pub fn len(&self) -> usize {
        self.flows.len()
    }

    /// Whether no flow is registered
    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }
}
