use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;

/// 待投递的通知
///
/// 内容保持不透明：`data` 原样携带事件载荷，具体渲染交给外部投递方。
#[derive(Builder, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    #[builder(into)]
    recipient: String,
    /// 触发该通知的事件类型
    #[builder(into)]
    event_type: String,
    /// 触发该通知的事件 ID（便于审计与去重）
    #[builder(into)]
    event_id: String,
    /// 产生该通知的处理器
    #[builder(into)]
    handler_id: String,
    #[builder(default)]
    data: Value,
}

impl Notification {
    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn handler_id(&self) -> &str {
        &self.handler_id
    }

    pub fn data(&self) -> &Value {
        &self.data
    }
}

/// 投递回执
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    pub delivery_id: String,
    pub delivered_at: DateTime<Utc>,
}

pub type DeliveryResult = Result<DeliveryReceipt, AppError>;
