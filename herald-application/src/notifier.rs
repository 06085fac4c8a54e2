use crate::notification::{DeliveryResult, Notification};
use async_trait::async_trait;

/// 通知投递方（邮件、站内信、推送等外部协作者）
///
/// - 由基础设施层提供实现，本 crate 只依赖该协议；
/// - 投递失败以 `AppError::Delivery` 返回，由调用它的处理器上抛给分发器记录。
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: Notification) -> DeliveryResult;
}
