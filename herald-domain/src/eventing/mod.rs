//! 事件分发子系统（eventing）
//!
//! 提供事件到处理器的注册与分发：
//! - `EventHandler`：处理某类事件的能力单元；
//! - `HandlerCatalog`：构建期将处理器标识解析为具体实现；
//! - `RegistryBuilder` / `EventRegistry`：构建阶段与服务阶段的注册表；
//! - `EventDispatcher`：按注册顺序扇出调用，逐个隔离失败并汇总为 `DispatchReport`。
//!
//! 该模块不绑定任何传输或队列实现，处理器自身负责对外的副作用。
//!
pub mod catalog;
pub mod dispatcher;
pub mod handler;
pub mod registry;
pub mod report;

pub use catalog::HandlerCatalog;
pub use dispatcher::{DispatchConfig, DispatchMode, EventDispatcher};
pub use handler::{EventHandler, FnHandler};
pub use registry::{EventRegistry, HandlerTable, RegistryBuilder};
pub use report::{DispatchReport, HandlerOutcome};
