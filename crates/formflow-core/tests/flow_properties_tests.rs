use formflow_core::{
    CompareOp, CoreError, FlowDefinition, FlowNavigator, FlowRegistry, NextStep, Predicate,
    StepId, SubmissionData, ValidationResult,
};
use serde_json::json;
use std::sync::Arc;

fn registry() -> Arc<FlowRegistry> {
    let mut builder = FlowRegistry::builder();
    builder
        .define_flow(
            "signup",
            ["personal", "adult", "minor", "confirm"],
            [
                (
                    StepId::from("personal"),
                    Predicate::compare("personal", "age", CompareOp::Lt, 18.0),
                    NextStep::step("minor"),
                ),
                (
                    StepId::from("personal"),
                    Predicate::compare("personal", "age", CompareOp::Gte, 18.0),
                    NextStep::step("adult"),
                ),
                (
                    StepId::from("adult"),
                    Predicate::Always,
                    NextStep::step("confirm"),
                ),
            ],
        )
        .unwrap()
        .define_flow("contact", ["name", "email", "message"], Vec::new())
        .unwrap();
    Arc::new(builder.build())
}

#[test]
fn registered_flows_have_unique_non_empty_steps() {
    let registry = registry();
    for flow_id in registry.flow_ids() {
        let flow = registry.lookup_flow(flow_id.as_str()).unwrap();
        assert!(!flow.steps().is_empty());

        let mut seen = std::collections::HashSet::new();
        for step in flow.steps() {
            assert!(seen.insert(step.clone()), "duplicate step {} in {}", step, flow_id);
        }
    }
}

#[test]
fn default_order_follows_steps_and_ends_with_sentinel() {
    let registry = registry();
    let navigator = FlowNavigator::new(registry.clone());
    let flow = registry.lookup_flow("contact").unwrap();
    let data = SubmissionData::new();

    for window in flow.steps().windows(2) {
        let next = navigator
            .compute_next_step("contact", window[0].as_str(), &data)
            .unwrap();
        assert_eq!(next, NextStep::Step(window[1].clone()));
    }

    let last = flow.last_step().as_str();
    assert_eq!(
        navigator.compute_next_step("contact", last, &data).unwrap(),
        NextStep::Complete
    );
}

#[test]
fn earlier_rule_wins_when_both_match() {
    let mut builder = FlowRegistry::builder();
    builder
        .define_flow(
            "overlap",
            ["start", "first", "second"],
            [
                (StepId::from("start"), Predicate::Always, NextStep::step("second")),
                (StepId::from("start"), Predicate::Always, NextStep::step("first")),
            ],
        )
        .unwrap();
    let navigator = FlowNavigator::new(Arc::new(builder.build()));

    assert_eq!(
        navigator
            .compute_next_step("overlap", "start", &SubmissionData::new())
            .unwrap(),
        NextStep::step("second")
    );
}

#[test]
fn age_based_branching() {
    let navigator = FlowNavigator::new(registry());

    let minor = SubmissionData::from_value(json!({"personal": {"age": "16"}})).unwrap();
    let adult = SubmissionData::from_value(json!({"personal": {"age": "18"}})).unwrap();

    assert_eq!(
        navigator.compute_next_step("signup", "personal", &minor).unwrap(),
        NextStep::step("minor")
    );
    assert_eq!(
        navigator.compute_next_step("signup", "personal", &adult).unwrap(),
        NextStep::step("adult")
    );
    // minor has no rule: falls through to the following step
    assert_eq!(
        navigator.compute_next_step("signup", "minor", &minor).unwrap(),
        NextStep::step("confirm")
    );
}

#[test]
fn compute_next_step_is_idempotent() {
    let navigator = FlowNavigator::new(registry());
    let data = SubmissionData::from_value(json!({"personal": {"age": 42}})).unwrap();

    let first = navigator.compute_next_step("signup", "personal", &data).unwrap();
    let second = navigator.compute_next_step("signup", "personal", &data).unwrap();
    assert_eq!(first, second);
}

#[test]
fn validation_result_examples() {
    let default = ValidationResult::builder().success(true).build();
    assert!(default.is_success());
    assert!(default.is_valid());
    assert_eq!(default.next_step(), None);

    let failed = ValidationResult::builder()
        .success(false)
        .errors(["Error 1", "Error 2"])
        .build();
    assert!(!failed.is_success());
    assert!(!failed.is_valid());
    assert_eq!(failed.errors().to_vec(), vec!["Error 1".to_string(), "Error 2".to_string()]);

    for success in [true, false] {
        let redirected = ValidationResult::builder()
            .success(success)
            .next_step("next_step")
            .build();
        assert_eq!(redirected.next_step(), Some(&NextStep::step("next_step")));
    }
}

#[test]
fn transition_to_missing_step_is_invalid() {
    let mut builder = FlowRegistry::builder();
    let err = builder
        .define_flow(
            "broken",
            ["a", "b"],
            [(StepId::from("a"), Predicate::Always, NextStep::step("c"))],
        )
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidStep(_)));

    let err = FlowDefinition::builder("broken")
        .steps(["a", "b"])
        .transition("c", Predicate::Always, "a")
        .build()
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidStep(_)));
}

#[test]
fn unknown_flow_is_not_found() {
    let registry = registry();
    let err = registry.lookup_flow("unregistered").unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.status_code(), 404);
}
