//! # Formflow DSL
//!
//! Flow definitions for Formflow can be written as YAML documents. This
//! crate parses those documents, validates them (collecting every problem
//! with a stable error code), and turns them into a
//! [`formflow_core::FlowRegistry`].
//!
//! ## Example
//!
//! ```
//! use formflow_dsl::{build_registry, parse_and_validate};
//!
//! let yaml = r#"
//! dsl_version: "1.0"
//! flows:
//!   - name: signup
//!     steps:
//!       - id: personal
//!         validations:
//!           - { field: age, rule: numeric }
//!       - id: adult
//!       - id: minor
//!     transitions:
//!       - from: personal
//!         to: minor
//!         when: { type: compare, step: personal, field: age, op: lt, value: 18 }
//!       - from: minor
//!         to: $complete
//! "#;
//!
//! let document = parse_and_validate(yaml).unwrap();
//! let registry = build_registry([&document]).unwrap();
//! assert!(registry.contains("signup"));
//! ```

mod error;
mod parser;

pub mod flow;
pub mod loader;
pub mod validation;

pub use error::DslError;
pub use flow::{FlowDocument, ParsedDocument, StepDocument, TransitionDocument};
pub use loader::{build_registry, load_dir, load_file};
pub use parser::{parse_document, SUPPORTED_VERSION};
pub use validation::{error_codes, validate_document, ValidationError};

/// Parse and validate a Formflow DSL YAML string.
///
/// # Errors
///
/// * Invalid YAML syntax or unknown condition/rule kinds
/// * Unsupported DSL version
/// * Validation errors (duplicate ids, unknown step references, bad patterns)
pub fn parse_and_validate(yaml_str: &str) -> Result<ParsedDocument, DslError> {
    let document = parser::parse_document(yaml_str)?;
    validation::validate_document(&document)?;
    Ok(document)
}

/// Returns a version string for the Formflow DSL crate
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
