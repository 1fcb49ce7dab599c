use crate::flow::ParsedDocument;
use crate::validation::{error_codes, ValidationError, Validator};
use formflow_core::domain::validation::compile_pattern;
use formflow_core::FieldRule;

/// Validates the field rules attached to steps
pub struct RuleValidator;

impl RuleValidator {
    /// Create a new rule validator
    pub fn new() -> Self {
        RuleValidator
    }

    fn check_rule(rule: &FieldRule) -> Option<(&'static str, String)> {
        match rule {
            FieldRule::Pattern { pattern } => compile_pattern(pattern)
                .err()
                .map(|e| (error_codes::INVALID_PATTERN, e.to_string())),
            FieldRule::Range {
                min: Some(min),
                max: Some(max),
            } if min > max => Some((
                error_codes::INVALID_RULE,
                format!("Range minimum {} is greater than maximum {}", min, max),
            )),
            _ => None,
        }
    }
}

impl Validator for RuleValidator {
    fn validate(&self, document: &ParsedDocument) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        for (flow_idx, flow) in document.flows.iter().enumerate() {
            for (step_idx, step) in flow.steps.iter().enumerate() {
                for (rule_idx, validation) in step.validations.iter().enumerate() {
                    if let Some((code, message)) = Self::check_rule(&validation.rule) {
                        errors.push(ValidationError {
                            code,
                            message: format!("Field '{}': {}", validation.field, message),
                            path: Some(format!(
                                "flows[{}].steps[{}].validations[{}]",
                                flow_idx, step_idx, rule_idx
                            )),
                        });
                    }
                }
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_document;

    #[test]
    fn test_bad_pattern_and_range() {
        let doc = parse_document(
            r#"
dsl_version: "1.0"
flows:
  - name: contact
    steps:
      - id: details
        validations:
          - { field: zip, rule: pattern, pattern: "([0-9" }
          - { field: age, rule: range, min: 10, max: 5 }
          - { field: email, rule: pattern, pattern: "^.+@.+$" }
"#,
        )
        .unwrap();

        let errors = RuleValidator::new().validate(&doc);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].code, error_codes::INVALID_PATTERN);
        assert!(errors[0].message.starts_with("Field 'zip'"));
        assert_eq!(errors[1].code, error_codes::INVALID_RULE);
        assert_eq!(
            errors[1].path.as_deref(),
            Some("flows[0].steps[0].validations[1]")
        );
    }
}
