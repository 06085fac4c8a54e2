//! 分发报告（DispatchReport）
//!
//! 一次分发的汇总结果，每个被调用的处理器对应一条记录，顺序与注册顺序一致。
//!
use crate::error::DispatchError;
use std::time::Duration;
use tracing::warn;

/// 单个处理器的执行结果
#[derive(Debug)]
pub struct HandlerOutcome {
    handler_id: String,
    result: Result<(), DispatchError>,
    elapsed: Duration,
}

impl HandlerOutcome {
    pub(crate) fn new(
        handler_id: impl Into<String>,
        result: Result<(), DispatchError>,
        elapsed: Duration,
    ) -> Self {
        Self {
            handler_id: handler_id.into(),
            result,
            elapsed,
        }
    }

    pub fn handler_id(&self) -> &str {
        &self.handler_id
    }

    pub fn result(&self) -> &Result<(), DispatchError> {
        &self.result
    }

    pub fn error(&self) -> Option<&DispatchError> {
        self.result.as_ref().err()
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

#[derive(Debug)]
pub struct DispatchReport {
    event_id: String,
    event_type: String,
    outcomes: Vec<HandlerOutcome>,
}

impl DispatchReport {
    pub(crate) fn new(
        event_id: impl Into<String>,
        event_type: impl Into<String>,
        outcomes: Vec<HandlerOutcome>,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            event_type: event_type.into(),
            outcomes,
        }
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn outcomes(&self) -> &[HandlerOutcome] {
        &self.outcomes
    }

    pub fn into_outcomes(self) -> Vec<HandlerOutcome> {
        self.outcomes
    }

    /// 按调用顺序返回处理器标识
    pub fn handler_ids(&self) -> Vec<&str> {
        self.outcomes.iter().map(HandlerOutcome::handler_id).collect()
    }

    /// 所有处理器均成功（空报告视为成功）
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(HandlerOutcome::is_success)
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &HandlerOutcome> {
        self.outcomes.iter().filter(|o| o.is_success())
    }

    pub fn failures(&self) -> impl Iterator<Item = &HandlerOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// 将捕获到的失败逐条写入日志（供“发出即忘”的调用方使用）
    pub fn log_failures(&self) {
        for outcome in self.failures() {
            if let Some(err) = outcome.error() {
                warn!(
                    event_type = %self.event_type,
                    event_id = %self.event_id,
                    handler = %outcome.handler_id,
                    error = %err,
                    "event handler failed"
                );
            }
        }
    }
}
