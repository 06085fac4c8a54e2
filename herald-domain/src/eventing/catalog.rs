//! 处理器目录（HandlerCatalog）
//!
//! 构建期将处理器标识解析为具体实现。路由表里出现的标识若不在目录中，
//! 会在 `RegistryBuilder::from_routes` 阶段失败，而不是留到分发时才暴露。
//!
use super::EventHandler;
use crate::error::{DispatchError, DispatchResult};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct HandlerCatalog {
    handlers: HashMap<String, Arc<dyn EventHandler>>,
}

impl HandlerCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 加入处理器；标识重复时返回 `CatalogConflict`
    pub fn insert(&mut self, handler: Arc<dyn EventHandler>) -> DispatchResult<()> {
        let id = handler.handler_id().to_string();
        if self.handlers.contains_key(&id) {
            return Err(DispatchError::CatalogConflict { handler: id });
        }
        self.handlers.insert(id, handler);
        Ok(())
    }

    /// 链式版本的 `insert`
    pub fn with(mut self, handler: Arc<dyn EventHandler>) -> DispatchResult<Self> {
        self.insert(handler)?;
        Ok(self)
    }

    pub fn get(&self, handler_id: &str) -> Option<Arc<dyn EventHandler>> {
        self.handlers.get(handler_id).cloned()
    }

    pub(crate) fn resolve(
        &self,
        event_type: &str,
        handler_id: &str,
    ) -> DispatchResult<Arc<dyn EventHandler>> {
        self.get(handler_id)
            .ok_or_else(|| DispatchError::UnknownHandler {
                event_type: event_type.to_string(),
                handler: handler_id.to_string(),
            })
    }

    pub fn contains(&self, handler_id: &str) -> bool {
        self.handlers.contains_key(handler_id)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
