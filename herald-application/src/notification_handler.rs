//! 通知处理器（NotificationHandler）
//!
//! 将事件转换为 `Notification` 并交给 `Notifier` 投递的通用 `EventHandler`。
//! 收件人通过 JSON Pointer（RFC 6901）从事件载荷中选取，例如 `/author_id`。
//!
use crate::error::AppError;
use crate::notification::Notification;
use crate::notifier::Notifier;
use async_trait::async_trait;
use bon::Builder;
use herald_domain::event::Event;
use herald_domain::eventing::EventHandler;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

#[derive(Builder)]
pub struct NotificationHandler {
    #[builder(into)]
    handler_id: String,
    notifier: Arc<dyn Notifier>,
    /// 收件人在载荷中的位置
    #[builder(into)]
    recipient_pointer: String,
}

impl NotificationHandler {
    pub fn recipient_pointer(&self) -> &str {
        &self.recipient_pointer
    }

    /// 根据事件组装通知；载荷中找不到收件人时返回 `MissingRecipient`
    pub fn compose(&self, event: &Event) -> Result<Notification, AppError> {
        let recipient = event
            .payload()
            .pointer(&self.recipient_pointer)
            .and_then(as_recipient)
            .ok_or_else(|| AppError::MissingRecipient {
                event_type: event.event_type().to_string(),
                pointer: self.recipient_pointer.clone(),
            })?;

        Ok(Notification::builder()
            .recipient(recipient)
            .event_type(event.event_type())
            .event_id(event.event_id())
            .handler_id(self.handler_id.as_str())
            .data(event.payload().clone())
            .build())
    }
}

fn as_recipient(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[async_trait]
impl EventHandler for NotificationHandler {
    fn handler_id(&self) -> &str {
        &self.handler_id
    }

    async fn handle(&self, event: &Event) -> anyhow::Result<()> {
        let notification = self.compose(event)?;
        let receipt = self.notifier.send(notification).await?;
        debug!(
            handler = %self.handler_id,
            delivery_id = %receipt.delivery_id,
            "notification sent"
        );
        Ok(())
    }
}
