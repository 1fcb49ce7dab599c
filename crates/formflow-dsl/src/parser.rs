use crate::error::DslError;
use crate::flow::ParsedDocument;

/// DSL version understood by this crate
pub const SUPPORTED_VERSION: &str = "1.0";

/// Parse a YAML string into a ParsedDocument.
///
/// This function handles the initial conversion from YAML text to structured data.
/// It does not check references between flows and steps; that is handled
/// separately by the validation module.
pub fn parse_document(yaml_str: &str) -> Result<ParsedDocument, DslError> {
    let document: ParsedDocument = serde_yaml::from_str(yaml_str)?;

    if document.dsl_version != SUPPORTED_VERSION {
        return Err(DslError::UnsupportedVersion(document.dsl_version));
    }

    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use formflow_core::{FieldRule, NextStep, Predicate};

    #[test]
    fn test_parse_minimal_valid_document() {
        let yaml = r#"
        dsl_version: "1.0"
        flows: []
        "#;

        let doc = parse_document(yaml).unwrap();
        assert_eq!(doc.dsl_version, "1.0");
        assert!(doc.flows.is_empty());
    }

    #[test]
    fn test_parse_full_flow() {
        let yaml = r#"
dsl_version: "1.0"
flows:
  - name: signup
    description: "Account signup"
    steps:
      - id: personal
        validations:
          - { field: age, rule: numeric }
          - { field: name, rule: min_length, value: 2, message: "Name is too short" }
      - id: adult
      - id: minor
    transitions:
      - from: personal
        to: minor
        when: { type: compare, step: personal, field: age, op: lt, value: 18 }
      - from: minor
        to: $complete
"#;

        let doc = parse_document(yaml).unwrap();
        let flow = &doc.flows[0];
        assert_eq!(flow.name, "signup");
        assert_eq!(flow.description.as_deref(), Some("Account signup"));
        assert_eq!(flow.step_ids().collect::<Vec<_>>(), vec!["personal", "adult", "minor"]);

        let rules = &flow.steps[0].validations;
        assert_eq!(rules[0].rule, FieldRule::Numeric);
        assert_eq!(rules[1].rule, FieldRule::MinLength { value: 2 });
        assert_eq!(rules[1].message.as_deref(), Some("Name is too short"));

        assert_eq!(flow.transitions[0].to, NextStep::step("minor"));
        assert!(matches!(flow.transitions[0].when, Some(Predicate::Compare { .. })));
        assert_eq!(flow.transitions[1].to, NextStep::Complete);
        assert!(flow.transitions[1].when.is_none());
    }

    #[test]
    fn test_invalid_yaml_syntax() {
        let yaml = r#"
        dsl_version: "1.0"
        flows: [
          - name: broken-flow  # Incorrect indentation
        "#;

        match parse_document(yaml).unwrap_err() {
            DslError::YamlError(_) => {}
            err => panic!("Expected YamlError, got {:?}", err),
        }
    }

    #[test]
    fn test_unsupported_dsl_version() {
        let yaml = r#"
        dsl_version: "2.0"
        flows: []
        "#;

        match parse_document(yaml).unwrap_err() {
            DslError::UnsupportedVersion(version) => assert_eq!(version, "2.0"),
            err => panic!("Expected UnsupportedVersion, got {:?}", err),
        }
    }

    #[test]
    fn test_unknown_predicate_type() {
        let yaml = r#"
dsl_version: "1.0"
flows:
  - name: f
    steps: [{ id: a }]
    transitions:
      - { from: a, to: $complete, when: { type: sometimes } }
"#;
        assert_eq!(parse_document(yaml).unwrap_err().error_code(), "ERR_DSL_YAML_PARSE");
    }
}
