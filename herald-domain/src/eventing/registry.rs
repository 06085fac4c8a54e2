//! 处理器注册表（Registry）
//!
//! 两个逻辑阶段：
//! - 构建（`RegistryBuilder`）：启动期可变，按事件类型登记有序的处理器序列；
//! - 服务（`EventRegistry`）：`freeze()` 之后读多写少，`lookup`/分发从
//!   `ArcSwap` 中取出不可变快照，无锁读取。
//!
//! 运行期若仍需增删处理器，`EventRegistry` 以写锁串行化写者，并采用写时复制：
//! 克隆当前表、修改副本、原子替换，读者永远不会观察到修改到一半的序列。
//!
use super::{EventHandler, HandlerCatalog};
use crate::error::{DispatchError, DispatchResult};
use crate::persist::RouteTable;
use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};

/// 不可变的路由快照：事件类型 → 有序处理器序列（非空，无重复标识）
#[derive(Clone, Default)]
pub struct HandlerTable {
    routes: HashMap<String, Vec<Arc<dyn EventHandler>>>,
}

impl HandlerTable {
    /// 按注册顺序返回处理器标识；未知事件类型返回空序列
    pub fn lookup(&self, event_type: &str) -> Vec<String> {
        self.handlers(event_type)
            .iter()
            .map(|h| h.handler_id().to_string())
            .collect()
    }

    /// 按注册顺序返回处理器
    pub fn handlers(&self, event_type: &str) -> &[Arc<dyn EventHandler>] {
        self.routes
            .get(event_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// 已注册的事件类型（字典序）
    pub fn event_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// 导出为可持久化的路由表
    pub fn route_table(&self) -> RouteTable {
        self.routes
            .keys()
            .map(|event_type| (event_type.clone(), self.lookup(event_type)))
            .collect()
    }

    fn insert(
        &mut self,
        event_type: &str,
        handler: Arc<dyn EventHandler>,
        position: Option<usize>,
    ) -> DispatchResult<()> {
        let current = self.handlers(event_type);
        if current
            .iter()
            .any(|h| h.handler_id() == handler.handler_id())
        {
            return Err(DispatchError::DuplicateHandler {
                event_type: event_type.to_string(),
                handler: handler.handler_id().to_string(),
            });
        }

        let len = current.len();
        let position = position.unwrap_or(len);
        if position > len {
            return Err(DispatchError::PositionOutOfRange {
                event_type: event_type.to_string(),
                position,
                len,
            });
        }

        debug!(
            event_type,
            handler = handler.handler_id(),
            position,
            "handler registered"
        );
        self.routes
            .entry(event_type.to_string())
            .or_default()
            .insert(position, handler);
        Ok(())
    }

    fn remove(&mut self, event_type: &str, handler_id: &str) -> DispatchResult<()> {
        let not_found = || DispatchError::NotFound {
            event_type: event_type.to_string(),
            handler: handler_id.to_string(),
        };

        let handlers = self.routes.get_mut(event_type).ok_or_else(not_found)?;
        let index = handlers
            .iter()
            .position(|h| h.handler_id() == handler_id)
            .ok_or_else(not_found)?;
        handlers.remove(index);

        // 序列为空时移除整个键，保持“键必有处理器”的约束
        if handlers.is_empty() {
            self.routes.remove(event_type);
        }

        debug!(event_type, handler = handler_id, "handler unregistered");
        Ok(())
    }
}

impl fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.event_types()
                    .into_iter()
                    .map(|event_type| (event_type, self.lookup(event_type))),
            )
            .finish()
    }
}

/// 构建阶段的注册表
#[derive(Clone, Debug, Default)]
pub struct RegistryBuilder {
    table: HandlerTable,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 由持久化的路由表构建，处理器标识经目录解析为具体实现
    ///
    /// 路由表中的空序列会被跳过；未知标识返回 `UnknownHandler`。
    pub fn from_routes(routes: &RouteTable, catalog: &HandlerCatalog) -> DispatchResult<Self> {
        let mut builder = Self::new();
        for (event_type, handler_ids) in routes {
            if handler_ids.is_empty() {
                debug!(event_type = %event_type, "skipping empty route");
                continue;
            }
            for handler_id in handler_ids {
                let handler = catalog.resolve(event_type, handler_id)?;
                builder.register(event_type, handler)?;
            }
        }
        Ok(builder)
    }

    /// 追加到序列末尾
    pub fn register(
        &mut self,
        event_type: impl AsRef<str>,
        handler: Arc<dyn EventHandler>,
    ) -> DispatchResult<&mut Self> {
        self.table.insert(event_type.as_ref(), handler, None)?;
        Ok(self)
    }

    /// 插入到序列的指定位置（`0..=len`）
    pub fn register_at(
        &mut self,
        event_type: impl AsRef<str>,
        handler: Arc<dyn EventHandler>,
        position: usize,
    ) -> DispatchResult<&mut Self> {
        self.table
            .insert(event_type.as_ref(), handler, Some(position))?;
        Ok(self)
    }

    pub fn unregister(&mut self, event_type: &str, handler_id: &str) -> DispatchResult<()> {
        self.table.remove(event_type, handler_id)
    }

    pub fn lookup(&self, event_type: &str) -> Vec<String> {
        self.table.lookup(event_type)
    }

    /// 结束构建阶段，进入服务阶段
    pub fn freeze(self) -> EventRegistry {
        info!(event_types = self.table.len(), "registry frozen");
        EventRegistry {
            table: ArcSwap::from_pointee(self.table),
            writer: Mutex::new(()),
        }
    }
}

/// 服务阶段的注册表：读无锁，写时复制
pub struct EventRegistry {
    table: ArcSwap<HandlerTable>,
    writer: Mutex<()>,
}

impl Default for EventRegistry {
    fn default() -> Self {
        RegistryBuilder::new().freeze()
    }
}

impl fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRegistry")
            .field("table", &*self.table.load())
            .finish()
    }
}

impl EventRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// 当前快照；持有期间即使发生 reload 也保持一致视图
    pub fn snapshot(&self) -> Arc<HandlerTable> {
        self.table.load_full()
    }

    pub fn lookup(&self, event_type: &str) -> Vec<String> {
        self.table.load().lookup(event_type)
    }

    pub fn route_table(&self) -> RouteTable {
        self.table.load().route_table()
    }

    pub fn register(
        &self,
        event_type: impl AsRef<str>,
        handler: Arc<dyn EventHandler>,
    ) -> DispatchResult<()> {
        self.mutate(|table| table.insert(event_type.as_ref(), handler, None))
    }

    pub fn register_at(
        &self,
        event_type: impl AsRef<str>,
        handler: Arc<dyn EventHandler>,
        position: usize,
    ) -> DispatchResult<()> {
        self.mutate(|table| table.insert(event_type.as_ref(), handler, Some(position)))
    }

    pub fn unregister(&self, event_type: &str, handler_id: &str) -> DispatchResult<()> {
        self.mutate(|table| table.remove(event_type, handler_id))
    }

    /// 以新构建的表整体替换当前快照
    pub fn reload(&self, builder: RegistryBuilder) {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        info!(event_types = builder.table.len(), "registry reloaded");
        self.table.store(Arc::new(builder.table));
    }

    fn mutate<F>(&self, f: F) -> DispatchResult<()>
    where
        F: FnOnce(&mut HandlerTable) -> DispatchResult<()>,
    {
        // 修改只作用于副本，写者 panic 不会留下半成品，因此中毒的锁可以直接沿用
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = HandlerTable::clone(&self.table.load());
        f(&mut next)?;
        self.table.store(Arc::new(next));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eventing::FnHandler;

    fn noop(id: &str) -> Arc<dyn EventHandler> {
        FnHandler::shared(id, |_| async { Ok(()) })
    }

    #[test]
    fn lookup_preserves_registration_order() {
        let mut builder = RegistryBuilder::new();
        builder
            .register("SubmissionCreated", noop("h1"))
            .unwrap()
            .register("SubmissionCreated", noop("h2"))
            .unwrap();

        assert_eq!(builder.lookup("SubmissionCreated"), ["h1", "h2"]);
    }

    #[test]
    fn lookup_unknown_type_is_empty() {
        let registry = RegistryBuilder::new().freeze();
        assert!(registry.lookup("Nope").is_empty());
    }

    #[test]
    fn duplicate_registration_leaves_sequence_unchanged() {
        let mut builder = RegistryBuilder::new();
        builder.register("CommentAdded", noop("h1")).unwrap();
        builder.register("CommentAdded", noop("h2")).unwrap();

        let err = builder.register("CommentAdded", noop("h1")).unwrap_err();
        assert!(matches!(
            err,
            DispatchError::DuplicateHandler { event_type, handler }
                if event_type == "CommentAdded" && handler == "h1"
        ));
        assert_eq!(builder.lookup("CommentAdded"), ["h1", "h2"]);
    }

    #[test]
    fn same_handler_may_serve_several_event_types() {
        let shared = noop("audit");
        let mut builder = RegistryBuilder::new();
        builder.register("CommentAdded", shared.clone()).unwrap();
        builder.register("BadgeGranted", shared).unwrap();

        assert_eq!(builder.lookup("CommentAdded"), ["audit"]);
        assert_eq!(builder.lookup("BadgeGranted"), ["audit"]);
    }

    #[test]
    fn register_at_inserts_and_checks_bounds() {
        let mut builder = RegistryBuilder::new();
        builder.register("EvaluationCreated", noop("b")).unwrap();
        builder.register_at("EvaluationCreated", noop("a"), 0).unwrap();
        builder.register_at("EvaluationCreated", noop("c"), 2).unwrap();

        assert_eq!(builder.lookup("EvaluationCreated"), ["a", "b", "c"]);

        let err = builder
            .register_at("EvaluationCreated", noop("z"), 9)
            .unwrap_err();
        assert!(matches!(
            err,
            DispatchError::PositionOutOfRange { position: 9, len: 3, .. }
        ));
        assert_eq!(builder.lookup("EvaluationCreated"), ["a", "b", "c"]);
    }

    #[test]
    fn unregister_removes_and_drops_empty_keys() {
        let mut builder = RegistryBuilder::new();
        builder.register("BadgeGranted", noop("h1")).unwrap();

        builder.unregister("BadgeGranted", "h1").unwrap();
        assert!(builder.lookup("BadgeGranted").is_empty());

        let registry = builder.freeze();
        assert!(registry.snapshot().is_empty());
    }

    #[test]
    fn unregister_missing_is_not_found() {
        let mut builder = RegistryBuilder::new();
        builder.register("BadgeGranted", noop("h1")).unwrap();

        assert!(matches!(
            builder.unregister("BadgeGranted", "h2"),
            Err(DispatchError::NotFound { .. })
        ));
        assert!(matches!(
            builder.unregister("CommentAdded", "h1"),
            Err(DispatchError::NotFound { .. })
        ));
    }

    #[test]
    fn runtime_mutation_does_not_touch_held_snapshots() {
        let mut builder = RegistryBuilder::new();
        builder.register("SubmissionCreated", noop("h1")).unwrap();
        let registry = builder.freeze();

        let before = registry.snapshot();
        registry.register("SubmissionCreated", noop("h2")).unwrap();

        assert_eq!(before.lookup("SubmissionCreated"), ["h1"]);
        assert_eq!(registry.lookup("SubmissionCreated"), ["h1", "h2"]);

        assert!(registry.register("SubmissionCreated", noop("h2")).is_err());
        assert_eq!(registry.lookup("SubmissionCreated"), ["h1", "h2"]);
    }

    #[test]
    fn reload_swaps_whole_table() {
        let mut builder = RegistryBuilder::new();
        builder.register("CommentAdded", noop("old")).unwrap();
        let registry = builder.freeze();

        let mut next = RegistryBuilder::new();
        next.register("BadgeGranted", noop("new")).unwrap();
        registry.reload(next);

        assert!(registry.lookup("CommentAdded").is_empty());
        assert_eq!(registry.lookup("BadgeGranted"), ["new"]);
    }

    #[test]
    fn route_table_round_trips_through_catalog() {
        let routes = RouteTable::new()
            .route("SubmissionCreated", "author")
            .and_then(|t| t.route("SubmissionCreated", "mentor"))
            .and_then(|t| t.route("BadgeGranted", "user"))
            .unwrap();
        let catalog = HandlerCatalog::new()
            .with(noop("author"))
            .and_then(|c| c.with(noop("mentor")))
            .and_then(|c| c.with(noop("user")))
            .unwrap();

        let registry = RegistryBuilder::from_routes(&routes, &catalog)
            .unwrap()
            .freeze();

        assert_eq!(registry.route_table(), routes);
    }

    #[test]
    fn from_routes_fails_on_unknown_handler() {
        let routes = RouteTable::new().route("CommentAdded", "ghost").unwrap();

        let err = RegistryBuilder::from_routes(&routes, &HandlerCatalog::new()).unwrap_err();
        assert!(matches!(err, DispatchError::UnknownHandler { handler, .. } if handler == "ghost"));
    }

    #[test]
    fn from_routes_skips_empty_sequences() {
        let routes = RouteTable::from_json(r#"{"CommentAdded": []}"#).unwrap();

        let builder = RegistryBuilder::from_routes(&routes, &HandlerCatalog::new()).unwrap();
        assert!(builder.freeze().snapshot().is_empty());
    }
}
