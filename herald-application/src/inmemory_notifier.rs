use crate::error::AppError;
use crate::notification::{DeliveryReceipt, DeliveryResult, Notification};
use crate::notifier::Notifier;
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashSet;
use std::sync::{Mutex, PoisonError};
use tracing::debug;
use uuid::Uuid;

/// 基于内存的 Notifier 实现
/// - 记录所有成功投递的通知，供测试与示例断言；
/// - 可在运行时将某些收件人标记为拒收，用于模拟外部投递失败
#[derive(Default)]
pub struct InMemoryNotifier {
    sent: Mutex<Vec<Notification>>,
    rejected: DashSet<String>,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// 之后发给该收件人的通知都将投递失败
    pub fn reject(&self, recipient: impl Into<String>) {
        self.rejected.insert(recipient.into());
    }

    pub fn accept(&self, recipient: &str) {
        self.rejected.remove(recipient);
    }

    /// 已投递通知的副本（按投递顺序）
    pub fn sent(&self) -> Vec<Notification> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn sent_to(&self, recipient: &str) -> Vec<Notification> {
        self.sent()
            .into_iter()
            .filter(|n| n.recipient() == recipient)
            .collect()
    }
}

#[async_trait]
impl Notifier for InMemoryNotifier {
    async fn send(&self, notification: Notification) -> DeliveryResult {
        if self.rejected.contains(notification.recipient()) {
            return Err(AppError::Delivery {
                recipient: notification.recipient().to_string(),
                reason: "recipient rejected".to_string(),
            });
        }

        debug!(
            recipient = notification.recipient(),
            event_type = notification.event_type(),
            handler = notification.handler_id(),
            "notification delivered"
        );
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);

        Ok(DeliveryReceipt {
            delivery_id: Uuid::new_v4().to_string(),
            delivered_at: Utc::now(),
        })
    }
}
