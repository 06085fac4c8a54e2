//! 事件分发基础库（herald-domain）
//!
//! 提供“事件类型 → 有序处理器序列”的注册表与分发器，用于在应用中实现：
//! - 不可变事件（`event`）与强类型载荷（`EventPayload`）
//! - 处理器注册、构建期解析与冻结（`eventing::RegistryBuilder`）
//! - 按注册顺序、逐个隔离失败的分发（`eventing::EventDispatcher`）
//! - 路由表的持久化形态（`persist::RouteTable`）
//!
//! 本 crate 不关心处理器对外产生的副作用（通知、邮件等），
//! 这些由上层以 `EventHandler` 实现并注入。
//!
//! 典型用法：
//! 1. 从持久化的路由表与处理器目录构建 `RegistryBuilder`，随后 `freeze()`；
//! 2. 以 `Arc<EventRegistry>` 构建 `EventDispatcher`；
//! 3. 业务代码在领域事件发生时调用 `dispatch`，按需检查返回的 `DispatchReport`。
//!
pub mod error;
pub mod event;
pub mod eventing;
pub mod persist;
