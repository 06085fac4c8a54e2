//! 分发层统一错误定义
//!
//! 覆盖注册冲突、处理器执行失败/超时、路由表加载与构建期解析等最小必要集合。
//! 注册类错误同步返回给调用方；执行类错误只会出现在 `DispatchReport` 中。
//!
use std::time::Duration;
use thiserror::Error;

/// 统一错误类型（分发层最小必要集）
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DispatchError {
    // --- 注册 ---
    #[error("handler already registered: event_type={event_type}, handler={handler}")]
    DuplicateHandler { event_type: String, handler: String },
    #[error("handler not registered: event_type={event_type}, handler={handler}")]
    NotFound { event_type: String, handler: String },
    #[error("position out of range: event_type={event_type}, position={position}, len={len}")]
    PositionOutOfRange {
        event_type: String,
        position: usize,
        len: usize,
    },

    // --- 执行 ---
    #[error("handler execution failed: handler={handler}, reason={reason}")]
    HandlerExecution { handler: String, reason: String },
    #[error("handler timed out: handler={handler}, timeout={timeout:?}")]
    Timeout { handler: String, timeout: Duration },

    // --- 构建期解析 / 路由表 ---
    #[error("unknown handler in route table: event_type={event_type}, handler={handler}")]
    UnknownHandler { event_type: String, handler: String },
    #[error("handler id already present in catalog: {handler}")]
    CatalogConflict { handler: String },
    #[error("route table error: {reason}")]
    RouteTable { reason: String },

    // --- 序列化 / IO ---
    #[error("serialization error: {source}")]
    Serde {
        #[from]
        source: serde_json::Error,
    },
    #[error("io error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl DispatchError {
    pub fn handler_execution(handler: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::HandlerExecution {
            handler: handler.into(),
            reason: reason.into(),
        }
    }

    /// 是否为执行期错误（执行失败或超时）
    pub fn is_execution(&self) -> bool {
        matches!(self, Self::HandlerExecution { .. } | Self::Timeout { .. })
    }
}

/// 统一 Result 类型别名
pub type DispatchResult<T> = Result<T, DispatchError>;
