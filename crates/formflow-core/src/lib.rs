//!
//! Formflow Core - multi-step form flow engine
//!
//! This crate defines the domain model of Formflow: flow definitions with
//! ordered steps and conditional transitions, per-step validation, the
//! immutable flow registry, and the services that move a session's
//! submission through a flow. Storage is abstracted behind
//! [`SubmissionRepository`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Domain layer - flows, transitions, validation, submissions
pub mod domain;

/// Application services - navigation and submission progression
pub mod application;

/// Core types
pub mod types;

/// Error types
pub mod error;

/// Engine configuration
pub mod config;

// Re-export key types
pub use config::{ProgressionConfig, StepDataMerge};
pub use error::{CoreError, ErrorKind};
pub use types::{StepValues, SubmissionData};

// Re-export main API types for easy use
pub use application::navigation_service::FlowNavigator;
pub use application::submission_service::{StepOutcome, SubmissionService, Transition};
pub use domain::events::SubmissionEvent;
pub use domain::flow_definition::{FlowDefinition, FlowDefinitionBuilder, FlowId, StepId};
pub use domain::registry::{FlowRegistry, FlowRegistryBuilder};
pub use domain::repository::SubmissionRepository;
pub use domain::submission::{FormSubmission, SessionId, SubmissionId, SubmissionStatus};
pub use domain::transition::{
    CompareOp, CustomPredicate, NextStep, Predicate, TransitionRule, COMPLETE_SENTINEL,
};
pub use domain::validation::{
    FieldRule, FieldValidation, RuleSetValidator, StepValidator, ValidationResult,
    ValidationResultBuilder,
};
