use anyhow::Result;
use herald_application::InMemoryNotifier;
use herald_application::lms::{self, BadgeGranted, ChallengeCompleted, SubmissionCreated};
use herald_domain::event::Event;
use herald_domain::eventing::EventDispatcher;
use herald_domain::persist::RouteTable;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

use config::DemoConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // .env 缺失不是错误
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("herald_domain=info".parse()?)
                .add_directive("herald_application=info".parse()?)
                .add_directive("demo=info".parse()?),
        )
        .init();

    let config = DemoConfig::from_env()?;
    info!(?config, "starting");

    let routes = match &config.routes_path {
        Some(path) => {
            info!(path = %path.display(), "loading route table");
            RouteTable::load(path)?
        }
        None => lms::default_routes(),
    };

    let notifier = Arc::new(InMemoryNotifier::new());
    let registry = Arc::new(lms::build_registry_from(&routes, notifier.clone())?);

    if let Some(path) = &config.export_path {
        registry.route_table().save(path)?;
        info!(path = %path.display(), "route table exported");
    }

    let dispatcher = Arc::new(
        EventDispatcher::builder()
            .registry(registry)
            .config(config.dispatch)
            .build(),
    );

    for event in sample_events()? {
        let report = dispatcher.dispatch(&event).await;
        info!(
            event_type = report.event_type(),
            handlers = ?report.handler_ids(),
            failed = report.failures().count(),
            "event dispatched"
        );
        report.log_failures();
    }

    // 发出即忘：失败只会出现在日志里
    notifier.reject("student-2");
    let badge = BadgeGranted {
        badge_id: "streak-7".into(),
        user_id: "student-2".into(),
    };
    dispatcher
        .spawn_dispatch(Event::from_payload(&badge)?)
        .await?;

    info!(delivered = notifier.sent().len(), "done");
    Ok(())
}

fn sample_events() -> Result<Vec<Event>> {
    Ok(vec![
        Event::from_payload(&SubmissionCreated {
            submission_id: "s-100".into(),
            challenge_id: "ch-7".into(),
            author_id: "student-1".into(),
            challenge_owner_id: "teacher-1".into(),
        })?,
        Event::from_payload(&ChallengeCompleted {
            challenge_id: "ch-7".into(),
            user_id: "student-1".into(),
            challenge_owner_id: "teacher-1".into(),
        })?,
        // 未注册的事件类型：空报告
        Event::new("ProfileViewed", serde_json::json!({"user_id": "student-1"})),
    ])
}
