use formflow_core::{
    CoreError, ProgressionConfig, SessionId, StepDataMerge, StepId, StepValues, SubmissionService,
    SubmissionStatus, Transition,
};
use formflow_dsl::{build_registry, parse_and_validate};
use formflow_state_inmemory::InMemoryStateStoreProvider;
use serde_json::json;
use std::sync::Arc;

const SIGNUP: &str = r#"
dsl_version: "1.0"
flows:
  - name: signup
    steps:
      - id: personal
        validations:
          - { field: name, rule: required }
          - { field: age, rule: range, min: 0, max: 130 }
      - id: adult
        validations:
          - { field: email, rule: pattern, pattern: "^[^@]+@[^@]+$" }
      - id: minor
        validations:
          - { field: guardian_email, rule: required }
      - id: confirm
        validations:
          - { field: terms, rule: accepted }
    transitions:
      - from: personal
        to: minor
        when: { type: compare, step: personal, field: age, op: lt, value: 18 }
      - from: adult
        to: confirm
"#;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

fn values(value: serde_json::Value) -> StepValues {
    value.as_object().cloned().unwrap_or_default()
}

fn service_with(config: ProgressionConfig) -> (SubmissionService, InMemoryStateStoreProvider) {
    init_tracing();
    let document = parse_and_validate(SIGNUP).unwrap();
    let registry = Arc::new(build_registry([&document]).unwrap());
    let provider = InMemoryStateStoreProvider::new();
    let service = SubmissionService::new(registry, provider.create_repository(), config);
    (service, provider)
}

#[tokio::test]
async fn test_adult_path_to_completion() {
    let (service, provider) = service_with(ProgressionConfig::default());
    let session = SessionId::from("session-adult");

    let shown = service.show(&session, "signup").await.unwrap();
    assert_eq!(shown.status(), SubmissionStatus::OnStep(StepId::from("personal")));
    assert_eq!(provider.submission_count().await, 1);

    // Visiting again does not create a second record
    let again = service.show(&session, "signup").await.unwrap();
    assert_eq!(again.id, shown.id);

    let outcome = service
        .submit_step(&session, "signup", "personal", values(json!({"name": "Ada", "age": "36"})))
        .await
        .unwrap();
    assert_eq!(
        outcome.transition,
        Transition::Advanced {
            from: StepId::from("personal"),
            to: StepId::from("adult")
        }
    );
    assert_eq!(outcome.submission.lock_version, 1);

    let outcome = service
        .submit_step(&session, "signup", "adult", values(json!({"email": "ada@example.com"})))
        .await
        .unwrap();
    assert_eq!(
        outcome.transition,
        Transition::Advanced {
            from: StepId::from("adult"),
            to: StepId::from("confirm")
        }
    );

    assert!(matches!(
        service.completion(&session).await,
        Err(CoreError::SubmissionNotCompleted(_))
    ));

    let outcome = service
        .submit_step(&session, "signup", "confirm", values(json!({"terms": "1"})))
        .await
        .unwrap();
    assert_eq!(outcome.transition, Transition::Completed { from: StepId::from("confirm") });

    let done = service.completion(&session).await.unwrap();
    assert!(done.completed);
    assert_eq!(done.lock_version, 3);
    assert_eq!(done.data.field("personal", "name"), Some(&json!("Ada")));
    assert_eq!(done.data.field("adult", "email"), Some(&json!("ada@example.com")));

    // Completed submissions accept no further steps
    let err = service
        .submit_step(&session, "signup", "confirm", values(json!({"terms": "1"})))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::SubmissionCompleted(_)));
    assert_eq!(err.status_code(), 409);

    // Showing a completed submission is read-only
    let shown = service.show(&session, "signup").await.unwrap();
    assert_eq!(shown.status(), SubmissionStatus::Completed);
}

#[tokio::test]
async fn test_minor_branch_and_rejections() {
    let (service, _provider) = service_with(ProgressionConfig::default());
    let session = SessionId::from("session-minor");

    let outcome = service
        .submit_step(&session, "signup", "personal", values(json!({"name": "", "age": "200"})))
        .await
        .unwrap();
    assert_eq!(outcome.transition, Transition::Stayed { step: StepId::from("personal") });
    assert_eq!(outcome.validation.errors().len(), 2);

    let stored = service.show(&session, "signup").await.unwrap();
    assert!(stored.data.is_empty());
    assert_eq!(stored.lock_version, 0);

    let outcome = service
        .submit_step(&session, "signup", "personal", values(json!({"name": "Sam", "age": 15})))
        .await
        .unwrap();
    assert_eq!(
        outcome.transition,
        Transition::Advanced {
            from: StepId::from("personal"),
            to: StepId::from("minor")
        }
    );

    let err = service
        .submit_step(&session, "signup", "confirm", values(json!({"terms": true})))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::StepOutOfOrder(_)));

    let outcome = service
        .submit_step(&session, "signup", "minor", values(json!({"guardian_email": "p@example.com"})))
        .await
        .unwrap();
    assert_eq!(
        outcome.transition,
        Transition::Advanced {
            from: StepId::from("minor"),
            to: StepId::from("confirm")
        }
    );
}

#[tokio::test]
async fn test_replace_mode_when_revisiting_steps() {
    let config = ProgressionConfig {
        enforce_current_step: false,
        step_data_merge: StepDataMerge::Replace,
    };
    let (service, _provider) = service_with(config);
    let session = SessionId::from("session-replace");

    service
        .submit_step(&session, "signup", "personal", values(json!({"name": "Ada", "age": 40, "nickname": "A"})))
        .await
        .unwrap();
    let outcome = service
        .submit_step(&session, "signup", "personal", values(json!({"name": "Ada", "age": 41})))
        .await
        .unwrap();

    let personal = outcome.submission.data.step("personal").cloned().unwrap_or_default();
    assert_eq!(personal.len(), 2);
    assert!(personal.get("nickname").is_none());
}

#[tokio::test]
async fn test_listing_and_unknown_lookups() {
    let (service, _provider) = service_with(ProgressionConfig::default());
    service.show(&SessionId::from("one"), "signup").await.unwrap();
    service.show(&SessionId::from("two"), "signup").await.unwrap();

    assert_eq!(service.list_submissions("signup").await.unwrap().len(), 2);
    assert!(service.list_submissions("nope").await.unwrap_err().is_not_found());
    assert!(matches!(
        service.completion(&SessionId::from("three")).await,
        Err(CoreError::SubmissionNotFound(_))
    ));
}
