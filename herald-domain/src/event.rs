//! 事件（Event）
//!
//! 不可变的事件值：类型标签 + 不透明载荷。注册表只关心 `event_type`，
//! 载荷由具体处理器自行解读（可通过 `payload_as` 反序列化为强类型）。
//!
use crate::error::DispatchResult;
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// 强类型事件载荷：声明其对应的事件类型标签
pub trait EventPayload: Serialize + DeserializeOwned {
    /// 事件类型（形如 `SubmissionCreated`）
    const EVENT_TYPE: &'static str;
}

#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
pub struct Event {
    /// 事件唯一标识符
    #[builder(into, default = Uuid::new_v4().to_string())]
    event_id: String,
    /// 事件类型，用于匹配处理器
    #[builder(into)]
    event_type: String,
    /// 事件发生时间
    #[builder(default = Utc::now())]
    occurred_at: DateTime<Utc>,
    /// 事件负载
    #[builder(default)]
    payload: Value,
}

impl Event {
    pub fn new(event_type: impl Into<String>, payload: Value) -> Self {
        Self::builder().event_type(event_type).payload(payload).build()
    }

    /// 由强类型载荷构造事件，类型标签取自 `P::EVENT_TYPE`
    pub fn from_payload<P: EventPayload>(payload: &P) -> DispatchResult<Self> {
        Ok(Self::new(P::EVENT_TYPE, serde_json::to_value(payload)?))
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn occurred_at(&self) -> &DateTime<Utc> {
        &self.occurred_at
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// 将载荷反序列化为强类型
    pub fn payload_as<T: DeserializeOwned>(&self) -> DispatchResult<T> {
        Ok(serde_json::from_value(self.payload.clone())?)
    }
}
