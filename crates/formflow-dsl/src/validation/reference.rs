use crate::flow::{FlowDocument, ParsedDocument};
use crate::validation::{error_codes, ValidationError, Validator};
use formflow_core::NextStep;
use std::collections::HashSet;

/// Validates references in the DSL document:
/// - Transition sources and targets
/// - Steps read by transition conditions
pub struct ReferenceValidator;

impl ReferenceValidator {
    /// Create a new reference validator
    pub fn new() -> Self {
        ReferenceValidator
    }

    fn validate_transitions(&self, flow: &FlowDocument, path: &str) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let step_ids: HashSet<&str> = flow.step_ids().collect();
        let available = || {
            flow.step_ids()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        };

        for (idx, transition) in flow.transitions.iter().enumerate() {
            let transition_path = format!("{}.transitions[{}]", path, idx);

            if !step_ids.contains(transition.from.as_str()) {
                errors.push(ValidationError {
                    code: error_codes::INVALID_REFERENCE,
                    message: format!(
                        "Transition source '{}' not found in flow '{}'. Available steps: {}",
                        transition.from,
                        flow.name,
                        available()
                    ),
                    path: Some(format!("{}.from", transition_path)),
                });
            }

            if let NextStep::Step(target) = &transition.to {
                if !step_ids.contains(target.as_str()) {
                    errors.push(ValidationError {
                        code: error_codes::INVALID_REFERENCE,
                        message: format!(
                            "Transition target '{}' not found in flow '{}'. Available steps: {}",
                            target,
                            flow.name,
                            available()
                        ),
                        path: Some(format!("{}.to", transition_path)),
                    });
                }
            }

            if let Some(predicate) = &transition.when {
                for step in predicate.referenced_steps() {
                    if !step_ids.contains(step) {
                        errors.push(ValidationError {
                            code: error_codes::INVALID_REFERENCE,
                            message: format!(
                                "Condition reads unknown step '{}' in flow '{}'",
                                step, flow.name
                            ),
                            path: Some(format!("{}.when", transition_path)),
                        });
                    }
                }
            }
        }

        errors
    }
}

impl Validator for ReferenceValidator {
    fn validate(&self, document: &ParsedDocument) -> Vec<ValidationError> {
        document
            .flows
            .iter()
            .enumerate()
            .flat_map(|(flow_idx, flow)| {
                self.validate_transitions(flow, &format!("flows[{}]", flow_idx))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_document;

    #[test]
    fn test_unknown_transition_references() {
        let doc = parse_document(
            r#"
dsl_version: "1.0"
flows:
  - name: signup
    steps: [{ id: personal }, { id: adult }]
    transitions:
      - from: personal
        to: minor
        when: { type: present, step: guardian, field: name }
      - from: ghost
        to: $complete
      - from: adult
        to: $complete
"#,
        )
        .unwrap();

        let errors = ReferenceValidator::new().validate(&doc);
        let paths: Vec<_> = errors.iter().filter_map(|e| e.path.as_deref()).collect();
        assert_eq!(
            paths,
            vec![
                "flows[0].transitions[0].to",
                "flows[0].transitions[0].when",
                "flows[0].transitions[1].from"
            ]
        );
        assert!(errors.iter().all(|e| e.code == error_codes::INVALID_REFERENCE));
        assert!(errors[0].message.contains("'personal', 'adult'"));
    }
}
