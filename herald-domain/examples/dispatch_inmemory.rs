/// 事件分发（内存版）示例
/// 展示 路由表 -> 目录解析 -> 冻结 -> 分发 的完整流程，以及单个处理器失败/超时时的报告
use anyhow::Result as AnyResult;
use herald_domain::event::Event;
use herald_domain::eventing::{
    DispatchConfig, DispatchMode, EventDispatcher, FnHandler, HandlerCatalog, RegistryBuilder,
};
use herald_domain::persist::RouteTable;
use serde_json::json;
use std::{sync::Arc, time::Duration};
use tracing_subscriber::EnvFilter;

// ============================================================================
// 路由表（与启动缓存文件同构）
// ============================================================================

const ROUTES: &str = r#"{
    "SubmissionCreated": ["log_submission", "slow_mentor_ping"],
    "BadgeGranted": ["flaky_mailer", "log_badge"]
}"#;

#[tokio::main]
async fn main() -> AnyResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("herald_domain=debug".parse()?))
        .init();

    let catalog = HandlerCatalog::new()
        .with(FnHandler::shared("log_submission", |ev: Event| async move {
            println!("[log_submission] {}", ev.payload());
            Ok(())
        }))?
        .with(FnHandler::shared("slow_mentor_ping", |_| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        }))?
        .with(FnHandler::shared("flaky_mailer", |_| async {
            anyhow::bail!("smtp connection refused")
        }))?
        .with(FnHandler::shared("log_badge", |ev: Event| async move {
            println!("[log_badge] {}", ev.payload());
            Ok(())
        }))?;

    let routes = RouteTable::from_json(ROUTES)?;
    let registry = Arc::new(RegistryBuilder::from_routes(&routes, &catalog)?.freeze());

    let dispatcher = Arc::new(
        EventDispatcher::builder()
            .registry(registry)
            .config(DispatchConfig {
                mode: DispatchMode::Concurrent { limit: 4 },
                handler_timeout: Some(Duration::from_millis(500)),
            })
            .build(),
    );

    // 1) 同步检查报告：slow_mentor_ping 超时，log_submission 不受影响
    let report = dispatcher
        .dispatch(&Event::new("SubmissionCreated", json!({"submission_id": "s-1"})))
        .await;
    for outcome in report.outcomes() {
        println!(
            "{} -> {:?} ({:?})",
            outcome.handler_id(),
            outcome.result(),
            outcome.elapsed()
        );
    }

    // 2) 发出即忘：失败由 log_failures 写入日志
    dispatcher
        .spawn_dispatch(Event::new("BadgeGranted", json!({"user_id": "u-1"})))
        .await?;

    // 3) 未注册的事件类型：空报告
    let empty = dispatcher
        .dispatch(&Event::new("ChallengeCompleted", json!({})))
        .await;
    assert!(empty.is_empty());

    println!("{}", dispatcher.registry().route_table().to_json_pretty()?);
    Ok(())
}
