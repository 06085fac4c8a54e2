//! 事件处理器（EventHandler）
//!
//! 定义响应某类事件的处理逻辑与元信息（处理器标识）。
//! 注册表对所有处理器一视同仁，只通过 `handle` 这一能力调用。
//!
use crate::event::Event;
use async_trait::async_trait;
use std::sync::Arc;

/// 事件处理器：处理分发给它的事件
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// 处理器标识（在同一事件类型下唯一，用于报告与审计）
    fn handler_id(&self) -> &str;
    /// 处理事件
    async fn handle(&self, event: &Event) -> anyhow::Result<()>;
}

/// 以闭包实现的处理器，便于测试与轻量场景
pub struct FnHandler<F> {
    id: String,
    f: F,
}

impl<F, Fut> FnHandler<F>
where
    F: Fn(Event) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    pub fn new(id: impl Into<String>, f: F) -> Self {
        Self { id: id.into(), f }
    }

    pub fn shared(id: impl Into<String>, f: F) -> Arc<dyn EventHandler>
    where
        F: 'static,
    {
        Arc::new(Self::new(id, f))
    }
}

#[async_trait]
impl<F, Fut> EventHandler for FnHandler<F>
where
    F: Fn(Event) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    fn handler_id(&self) -> &str {
        &self.id
    }

    async fn handle(&self, event: &Event) -> anyhow::Result<()> {
        (self.f)(event.clone()).await
    }
}
