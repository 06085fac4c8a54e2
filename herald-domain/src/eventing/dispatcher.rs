//! 事件分发器（EventDispatcher）
//!
//! 从注册表快照解析出事件类型对应的处理器，按注册顺序调用并逐个隔离失败：
//! - 顺序模式：在调用方任务上依次执行；
//! - 并发模式：每个处理器在 tokio 运行时上独立 spawn，最多 `limit` 个同时在途，
//!   结果仍按注册顺序收集；
//! - 单处理器超时只取消该处理器并记录 `Timeout`，不影响其它处理器；
//! - 处理器返回错误或 panic 都记录为 `HandlerExecution`，分发本身永不失败。
//!
use super::report::{DispatchReport, HandlerOutcome};
use super::{EventHandler, EventRegistry};
use crate::error::DispatchError;
use crate::event::Event;
use bon::Builder;
use futures_util::future::BoxFuture;
use futures_util::{FutureExt, StreamExt, stream};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{Instrument, Span, debug, info_span};

#[derive(Builder)]
pub struct EventDispatcher {
    registry: Arc<EventRegistry>,
    #[builder(default)]
    config: DispatchConfig,
}

impl EventDispatcher {
    pub fn registry(&self) -> &Arc<EventRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// 分发事件，返回逐个处理器的结果；未注册的事件类型返回空报告
    pub async fn dispatch(&self, event: &Event) -> DispatchReport {
        let span = info_span!(
            "dispatch",
            event_type = event.event_type(),
            event_id = event.event_id()
        );

        async move {
            // 整次分发只读取一次快照，期间的注册变更不影响本次调用
            let handlers = self.registry.snapshot().handlers(event.event_type()).to_vec();
            if handlers.is_empty() {
                debug!("no handlers registered");
                return DispatchReport::new(event.event_id(), event.event_type(), Vec::new());
            }

            let timeout = self.config.handler_timeout;
            let outcomes = match self.config.mode {
                DispatchMode::Sequential => {
                    let mut outcomes = Vec::with_capacity(handlers.len());
                    for handler in handlers {
                        outcomes.push(run_handler(handler, event, timeout).await);
                    }
                    outcomes
                }
                DispatchMode::Concurrent { limit } => {
                    Self::fan_out(handlers, event, timeout, limit).await
                }
            };

            let report = DispatchReport::new(event.event_id(), event.event_type(), outcomes);
            debug!(
                handlers = report.len(),
                failed = report.failures().count(),
                "dispatch finished"
            );
            report
        }
        .instrument(span)
        .await
    }

    /// 发出即忘：后台分发并将捕获的失败写入日志
    pub fn spawn_dispatch(self: &Arc<Self>, event: Event) -> JoinHandle<DispatchReport> {
        let dispatcher = Arc::clone(self);
        tokio::spawn(async move {
            let report = dispatcher.dispatch(&event).await;
            report.log_failures();
            report
        })
    }

    async fn fan_out(
        handlers: Vec<Arc<dyn EventHandler>>,
        event: &Event,
        timeout: Option<Duration>,
        limit: usize,
    ) -> Vec<HandlerOutcome> {
        let event = Arc::new(event.clone());
        let span = Span::current();

        // 每个任务在被 `buffered` 轮询时才 spawn，因此同时在途的处理器不超过 `limit`；
        // 先装箱成 Vec 再交给 stream，避免闭包借用跨 await 导致的 Send 推导失败
        let jobs: Vec<BoxFuture<'static, HandlerOutcome>> = handlers
            .into_iter()
            .map(|handler| {
                let event = Arc::clone(&event);
                let span = span.clone();
                let handler_id = handler.handler_id().to_string();

                async move {
                    let task = tokio::spawn(
                        async move { run_handler(handler, &event, timeout).await }.instrument(span),
                    );
                    match task.await {
                        Ok(outcome) => outcome,
                        Err(err) => HandlerOutcome::new(
                            handler_id.clone(),
                            Err(DispatchError::handler_execution(handler_id, err.to_string())),
                            Duration::ZERO,
                        ),
                    }
                }
                .boxed()
            })
            .collect();

        // `buffered` 按输入顺序产出结果，报告顺序因此与注册顺序一致
        stream::iter(jobs)
            .buffered(limit.max(1))
            .collect()
            .await
    }
}

async fn run_handler(
    handler: Arc<dyn EventHandler>,
    event: &Event,
    timeout: Option<Duration>,
) -> HandlerOutcome {
    let handler_id = handler.handler_id().to_string();
    let started = Instant::now();
    let call = AssertUnwindSafe(handler.handle(event)).catch_unwind();

    let finished = match timeout {
        Some(limit) => time::timeout(limit, call).await.ok(),
        None => Some(call.await),
    };

    let result = match finished {
        None => Err(DispatchError::Timeout {
            handler: handler_id.clone(),
            timeout: timeout.unwrap_or_default(),
        }),
        Some(Ok(Ok(()))) => Ok(()),
        Some(Ok(Err(err))) => Err(DispatchError::handler_execution(
            &handler_id,
            format!("{err:#}"),
        )),
        Some(Err(panic)) => Err(DispatchError::handler_execution(
            &handler_id,
            panic_message(panic.as_ref()),
        )),
    };

    HandlerOutcome::new(handler_id, result, started.elapsed())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());
    format!("panicked: {detail}")
}

/// 处理器调度方式
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DispatchMode {
    /// 在调用方任务上依次执行
    Sequential,
    /// 每个处理器独立 spawn，最多 `limit` 个同时执行
    Concurrent { limit: usize },
}

/// 分发配置
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub mode: DispatchMode,
    /// 单个处理器的超时；`None`（或配置为 0）表示不限时
    #[serde(rename = "handler_timeout_ms", with = "duration_ms")]
    pub handler_timeout: Option<Duration>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            mode: DispatchMode::Sequential,
            handler_timeout: Some(Duration::from_secs(30)),
        }
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        value
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        // 0 与缺省一致，表示不限时
        Ok(Option::<u64>::deserialize(d)?
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis))
    }
}
