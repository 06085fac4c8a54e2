use herald_application::InMemoryNotifier;
use herald_application::lms::{self, CommentAdded, EvaluationCreated};
use herald_domain::event::Event;
use herald_domain::eventing::EventDispatcher;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let notifier = Arc::new(InMemoryNotifier::new());
    let registry = Arc::new(lms::build_registry(notifier.clone())?);
    let dispatcher = EventDispatcher::builder().registry(registry).build();

    let comment = CommentAdded {
        comment_id: "c-1".into(),
        submission_id: "s-1".into(),
        commenter_id: "mentor-1".into(),
        submission_author_id: "student-1".into(),
    };
    let report = dispatcher.dispatch(&Event::from_payload(&comment)?).await;
    println!("CommentAdded -> {:?}", report.handler_ids());

    // 投递方拒收 -> 报告中记录失败，分发本身正常返回
    notifier.reject("student-1");
    let evaluation = EvaluationCreated {
        evaluation_id: "ev-1".into(),
        submission_id: "s-1".into(),
        evaluator_id: "mentor-1".into(),
        author_id: "student-1".into(),
        score: Some(92.5),
    };
    let report = dispatcher
        .dispatch(&Event::from_payload(&evaluation)?)
        .await;
    for failed in report.failures() {
        println!("{} failed: {:?}", failed.handler_id(), failed.error());
    }

    println!("delivered: {}", notifier.sent().len());
    Ok(())
}
