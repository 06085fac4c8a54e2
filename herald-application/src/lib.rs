//! 事件分发的应用层（herald-application）
//!
//! 在 `herald-domain` 的注册表与分发器之上提供通知投递的输出边界：
//! - `Notifier`：外部投递协作者协议，`send(notification) -> DeliveryResult`；
//! - `NotificationHandler`：把事件转换为通知并投递的通用处理器；
//! - `lms`：学习平台的事件、载荷与默认路由表。
//!
pub mod error;
pub mod inmemory_notifier;
pub mod lms;
pub mod notification;
pub mod notification_handler;
pub mod notifier;

pub use inmemory_notifier::InMemoryNotifier;
pub use notification_handler::NotificationHandler;
