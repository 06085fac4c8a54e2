//! 学习平台（LMS）事件目录
//!
//! 声明平台的领域事件、强类型载荷，以及“事件 → 通知处理器”的默认路由。
//! 默认路由与启动期缓存文件同构，可直接导出为 `RouteTable` 或从文件覆盖。
//!
use crate::error::AppError;
use crate::notification_handler::NotificationHandler;
use crate::notifier::Notifier;
use herald_domain::event::EventPayload;
use herald_domain::eventing::{EventRegistry, HandlerCatalog, RegistryBuilder};
use herald_domain::persist::RouteTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

pub const COMMENT_ADDED: &str = "CommentAdded";
pub const EVALUATION_CREATED: &str = "EvaluationCreated";
pub const SUBMISSION_CREATED: &str = "SubmissionCreated";
pub const BADGE_GRANTED: &str = "BadgeGranted";
pub const CERTIFICATE_ISSUED: &str = "CertificateIssued";
pub const CHALLENGE_COMPLETED: &str = "ChallengeCompleted";

/// (事件类型, 处理器标识, 收件人指针)，同一事件类型内的先后即调用顺序
const LISTENERS: &[(&str, &str, &str)] = &[
    (
        COMMENT_ADDED,
        "comment_added.notify_submission_author",
        "/submission_author_id",
    ),
    (
        EVALUATION_CREATED,
        "evaluation_created.notify_author",
        "/author_id",
    ),
    (
        SUBMISSION_CREATED,
        "submission_created.notify_author",
        "/author_id",
    ),
    (
        SUBMISSION_CREATED,
        "submission_created.notify_challenge_owner",
        "/challenge_owner_id",
    ),
    (BADGE_GRANTED, "badge_granted.notify_user", "/user_id"),
    (CERTIFICATE_ISSUED, "certificate_issued.notify_user", "/user_id"),
    (CHALLENGE_COMPLETED, "challenge_completed.notify_user", "/user_id"),
    (
        CHALLENGE_COMPLETED,
        "challenge_completed.notify_challenge_owner",
        "/challenge_owner_id",
    ),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentAdded {
    pub comment_id: String,
    pub submission_id: String,
    pub commenter_id: String,
    pub submission_author_id: String,
}

impl EventPayload for CommentAdded {
    const EVENT_TYPE: &'static str = COMMENT_ADDED;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationCreated {
    pub evaluation_id: String,
    pub submission_id: String,
    pub evaluator_id: String,
    pub author_id: String,
    pub score: Option<f64>,
}

impl EventPayload for EvaluationCreated {
    const EVENT_TYPE: &'static str = EVALUATION_CREATED;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionCreated {
    pub submission_id: String,
    pub challenge_id: String,
    pub author_id: String,
    pub challenge_owner_id: String,
}

impl EventPayload for SubmissionCreated {
    const EVENT_TYPE: &'static str = SUBMISSION_CREATED;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BadgeGranted {
    pub badge_id: String,
    pub user_id: String,
}

impl EventPayload for BadgeGranted {
    const EVENT_TYPE: &'static str = BADGE_GRANTED;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateIssued {
    pub certificate_id: String,
    pub course_id: String,
    pub user_id: String,
}

impl EventPayload for CertificateIssued {
    const EVENT_TYPE: &'static str = CERTIFICATE_ISSUED;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeCompleted {
    pub challenge_id: String,
    pub user_id: String,
    pub challenge_owner_id: String,
}

impl EventPayload for ChallengeCompleted {
    const EVENT_TYPE: &'static str = CHALLENGE_COMPLETED;
}

/// 平台默认路由表
pub fn default_routes() -> RouteTable {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (event_type, handler_id, _) in LISTENERS {
        grouped
            .entry(event_type.to_string())
            .or_default()
            .push(handler_id.to_string());
    }
    grouped.into_iter().collect()
}

/// 平台全部通知处理器，共享同一个投递方
pub fn handler_catalog(notifier: Arc<dyn Notifier>) -> Result<HandlerCatalog, AppError> {
    let mut catalog = HandlerCatalog::new();
    for (_, handler_id, pointer) in LISTENERS {
        let handler = NotificationHandler::builder()
            .handler_id(*handler_id)
            .notifier(notifier.clone())
            .recipient_pointer(*pointer)
            .build();
        catalog.insert(Arc::new(handler))?;
    }
    Ok(catalog)
}

/// 以指定路由表构建并冻结注册表
pub fn build_registry_from(
    routes: &RouteTable,
    notifier: Arc<dyn Notifier>,
) -> Result<EventRegistry, AppError> {
    let catalog = handler_catalog(notifier)?;
    Ok(RegistryBuilder::from_routes(routes, &catalog)?.freeze())
}

/// 以默认路由表构建并冻结注册表
pub fn build_registry(notifier: Arc<dyn Notifier>) -> Result<EventRegistry, AppError> {
    build_registry_from(&default_routes(), notifier)
}
