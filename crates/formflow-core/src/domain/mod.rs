/// Flow definition domain models
pub mod flow_definition;

/// Transition rules and predicates
pub mod transition;

/// Step validation
pub mod validation;

/// Flow registry
pub mod registry;

/// Submission aggregate
pub mod submission;

/// Domain events
pub mod events;

/// Repository interfaces
pub mod repository;
