//! 持久化（persist）
//!
//! 路由表的序列化形态与读写，供启动期构建注册表、以及重新编译后导出缓存。
//!
mod route_table;

pub use route_table::RouteTable;
