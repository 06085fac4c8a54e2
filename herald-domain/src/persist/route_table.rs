//! 路由表（RouteTable）
//!
//! 注册表的持久化形态：事件类型 → 有序处理器标识列表，以 JSON 对象存储，
//! 启动时加载，作为 `RegistryBuilder` 构建阶段的只读输入。
//! 键按字典序排列，保证导出结果稳定可比对；列表顺序即调用顺序。
//!
use crate::error::{DispatchError, DispatchResult};
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RouteTable {
    routes: BTreeMap<String, Vec<String>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条路由；同一事件类型下重复的标识返回 `RouteTable` 错误
    pub fn route(
        mut self,
        event_type: impl Into<String>,
        handler_id: impl Into<String>,
    ) -> DispatchResult<Self> {
        let event_type = event_type.into();
        let handler_id = handler_id.into();
        let handlers = self.routes.entry(event_type.clone()).or_default();
        if handlers.contains(&handler_id) {
            return Err(DispatchError::RouteTable {
                reason: format!("duplicate handler {handler_id} for {event_type}"),
            });
        }
        handlers.push(handler_id);
        Ok(self)
    }

    pub fn handlers(&self, event_type: &str) -> &[String] {
        self.routes
            .get(event_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Vec<String>> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn from_json(json: &str) -> DispatchResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> DispatchResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> DispatchResult<Self> {
        let raw = fs::read_to_string(path.as_ref())?;
        Self::from_json(&raw)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> DispatchResult<()> {
        fs::write(path.as_ref(), self.to_json_pretty()?)?;
        Ok(())
    }
}

impl FromIterator<(String, Vec<String>)> for RouteTable {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        Self {
            routes: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RouteTable {
    type Item = (&'a String, &'a Vec<String>);
    type IntoIter = btree_map::Iter<'a, String, Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.routes.iter()
    }
}

// 手写反序列化：重复的事件类型键视为损坏的缓存，而不是静默保留最后一份列表
impl<'de> Deserialize<'de> for RouteTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RoutesVisitor;

        impl<'de> Visitor<'de> for RoutesVisitor {
            type Value = RouteTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of event type to handler ids")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut routes = BTreeMap::new();
                while let Some((event_type, handlers)) = map.next_entry::<String, Vec<String>>()? {
                    if routes.contains_key(&event_type) {
                        return Err(de::Error::custom(format!(
                            "duplicate event type {event_type}"
                        )));
                    }
                    routes.insert(event_type, handlers);
                }
                Ok(RouteTable { routes })
            }
        }

        deserializer.deserialize_map(RoutesVisitor)
    }
}
