use anyhow::Result as AnyResult;
use herald_application::InMemoryNotifier;
use herald_application::error::AppError;
use herald_application::lms::{self, BadgeGranted, SubmissionCreated};
use herald_domain::error::DispatchError;
use herald_domain::event::Event;
use herald_domain::eventing::{DispatchConfig, DispatchMode, EventDispatcher};
use std::sync::Arc;

fn setup(mode: DispatchMode) -> AnyResult<(Arc<InMemoryNotifier>, EventDispatcher)> {
    let notifier = Arc::new(InMemoryNotifier::new());
    let registry = lms::build_registry(notifier.clone())?;
    let dispatcher = EventDispatcher::builder()
        .registry(Arc::new(registry))
        .config(DispatchConfig {
            mode,
            ..DispatchConfig::default()
        })
        .build();
    Ok((notifier, dispatcher))
}

fn submission() -> SubmissionCreated {
    SubmissionCreated {
        submission_id: "s-1".into(),
        challenge_id: "ch-1".into(),
        author_id: "student-1".into(),
        challenge_owner_id: "teacher-1".into(),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn submission_created_notifies_author_then_owner() -> AnyResult<()> {
    for mode in [
        DispatchMode::Sequential,
        DispatchMode::Concurrent { limit: 4 },
    ] {
        let (notifier, dispatcher) = setup(mode)?;
        let report = dispatcher
            .dispatch(&Event::from_payload(&submission())?)
            .await;

        assert!(report.is_success());
        assert_eq!(
            report.handler_ids(),
            [
                "submission_created.notify_author",
                "submission_created.notify_challenge_owner"
            ]
        );
        assert_eq!(notifier.sent_to("student-1").len(), 1);
        assert_eq!(notifier.sent_to("teacher-1").len(), 1);
    }
    Ok(())
}

#[tokio::test]
async fn rejected_delivery_is_isolated_to_its_handler() -> AnyResult<()> {
    let (notifier, dispatcher) = setup(DispatchMode::Sequential)?;
    notifier.reject("student-1");

    let report = dispatcher
        .dispatch(&Event::from_payload(&submission())?)
        .await;

    let outcomes = report.outcomes();
    assert!(matches!(
        outcomes[0].error(),
        Some(DispatchError::HandlerExecution { handler, reason })
            if handler == "submission_created.notify_author" && reason.contains("student-1")
    ));
    assert!(outcomes[1].is_success());
    assert_eq!(notifier.sent().len(), 1);
    assert_eq!(notifier.sent()[0].recipient(), "teacher-1");
    Ok(())
}

#[tokio::test]
async fn badge_granted_carries_payload_to_notification() -> AnyResult<()> {
    let (notifier, dispatcher) = setup(DispatchMode::Sequential)?;
    let granted = BadgeGranted {
        badge_id: "first-evaluation".into(),
        user_id: "student-2".into(),
    };
    let event = Event::from_payload(&granted)?;

    dispatcher.dispatch(&event).await;

    let sent = notifier.sent_to("student-2");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].handler_id(), "badge_granted.notify_user");
    assert_eq!(sent[0].event_id(), event.event_id());
    assert_eq!(serde_json::from_value::<BadgeGranted>(sent[0].data().clone())?, granted);
    Ok(())
}

#[tokio::test]
async fn malformed_payload_is_reported_as_missing_recipient() -> AnyResult<()> {
    let (notifier, dispatcher) = setup(DispatchMode::Sequential)?;

    let report = dispatcher
        .dispatch(&Event::new(lms::CERTIFICATE_ISSUED, serde_json::json!({"course_id": "c-1"})))
        .await;

    assert_eq!(report.len(), 1);
    assert!(matches!(
        report.outcomes()[0].error(),
        Some(DispatchError::HandlerExecution { reason, .. }) if reason.contains("/user_id")
    ));
    assert!(notifier.sent().is_empty());
    Ok(())
}

#[test]
fn catalog_resolves_every_default_route() -> Result<(), AppError> {
    let catalog = lms::handler_catalog(Arc::new(InMemoryNotifier::new()))?;
    for (_, handlers) in &lms::default_routes() {
        for handler_id in handlers {
            assert!(catalog.contains(handler_id), "{handler_id}");
        }
    }
    Ok(())
}
