use crate::flow::{FlowDocument, ParsedDocument};
use crate::validation::{error_codes, ValidationError, Validator};
use std::collections::HashSet;

/// Validates basic flow structure and uniqueness constraints
pub struct FlowValidator;

impl FlowValidator {
    /// Create a new flow validator
    pub fn new() -> Self {
        FlowValidator
    }

    /// Validate that flow names are present and unique within the document
    fn validate_flow_names(&self, document: &ParsedDocument) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let mut names = HashSet::with_capacity(document.flows.len());

        for (flow_idx, flow) in document.flows.iter().enumerate() {
            let path = format!("flows[{}].name", flow_idx);
            if flow.name.trim().is_empty() {
                errors.push(ValidationError {
                    code: error_codes::MISSING_REQUIRED_FIELD,
                    message: "Flow name must not be empty".to_string(),
                    path: Some(path),
                });
            } else if !names.insert(flow.name.as_str()) {
                errors.push(ValidationError {
                    code: error_codes::DUPLICATE_ID,
                    message: format!("Duplicate flow name: '{}' - flow names must be unique", flow.name),
                    path: Some(path),
                });
            }
        }

        errors
    }

    /// Validate the step list of a flow: non-empty, unique, not reserved
    fn validate_steps(&self, flow: &FlowDocument, path: &str) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if flow.steps.is_empty() {
            errors.push(ValidationError {
                code: error_codes::MISSING_REQUIRED_FIELD,
                message: format!("Flow '{}' must have at least one step", flow.name),
                path: Some(format!("{}.steps", path)),
            });
            return errors;
        }

        let mut step_ids = HashSet::with_capacity(flow.steps.len());
        for (step_idx, step) in flow.steps.iter().enumerate() {
            let step_path = format!("{}.steps[{}].id", path, step_idx);
            if step.id.trim().is_empty() || step.id.starts_with('$') {
                errors.push(ValidationError {
                    code: error_codes::RESERVED_ID,
                    message: format!(
                        "Invalid step ID: '{}' - step IDs must be non-empty and must not start with '$'",
                        step.id
                    ),
                    path: Some(step_path),
                });
            } else if !step_ids.insert(step.id.as_str()) {
                errors.push(ValidationError {
                    code: error_codes::DUPLICATE_ID,
                    message: format!(
                        "Duplicate step ID: '{}' - step IDs must be unique within a flow",
                        step.id
                    ),
                    path: Some(step_path),
                });
            }
        }

        errors
    }
}

impl Validator for FlowValidator {
    fn validate(&self, document: &ParsedDocument) -> Vec<ValidationError> {
        let mut errors = self.validate_flow_names(document);

        for (flow_idx, flow) in document.flows.iter().enumerate() {
            let path = format!("flows[{}]", flow_idx);
            errors.extend(self.validate_steps(flow, &path));
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_document;

    #[test]
    fn test_duplicate_flow_and_step_ids() {
        let doc = parse_document(
            r#"
dsl_version: "1.0"
flows:
  - name: signup
    steps: [{ id: a }, { id: b }, { id: a }]
  - name: signup
    steps: [{ id: x }]
"#,
        )
        .unwrap();

        let errors = FlowValidator::new().validate(&doc);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].code, error_codes::DUPLICATE_ID);
        assert_eq!(errors[0].path.as_deref(), Some("flows[1].name"));
        assert_eq!(errors[1].path.as_deref(), Some("flows[0].steps[2].id"));
    }

    #[test]
    fn test_empty_and_reserved_steps() {
        let doc = parse_document(
            r#"
dsl_version: "1.0"
flows:
  - name: empty
  - name: reserved
    steps: [{ id: "$complete" }, { id: "" }]
"#,
        )
        .unwrap();

        let errors = FlowValidator::new().validate(&doc);
        let codes: Vec<_> = errors.iter().map(|e| e.code).collect();
        assert_eq!(
            codes,
            vec![
                error_codes::MISSING_REQUIRED_FIELD,
                error_codes::RESERVED_ID,
                error_codes::RESERVED_ID
            ]
        );
    }
}
