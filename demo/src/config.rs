use anyhow::{Context, Result, bail};
use herald_domain::eventing::{DispatchConfig, DispatchMode};
use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_CONCURRENCY: usize = 8;

/// 演示程序配置，来自环境变量（启动时先加载 `.env`）
#[derive(Debug, Clone)]
pub struct DemoConfig {
    /// 路由表缓存文件；缺省使用内置的 LMS 路由
    pub routes_path: Option<PathBuf>,
    /// 构建完成后导出路由表的位置
    pub export_path: Option<PathBuf>,
    pub dispatch: DispatchConfig,
}

impl DemoConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut dispatch = DispatchConfig::default();

        match lookup("HERALD_DISPATCH_MODE").as_deref() {
            None | Some("sequential") => {}
            Some("concurrent") => {
                let limit = parse(&lookup, "HERALD_CONCURRENCY")?.unwrap_or(DEFAULT_CONCURRENCY);
                dispatch.mode = DispatchMode::Concurrent { limit };
            }
            Some(other) => bail!("unknown HERALD_DISPATCH_MODE: {other}"),
        }

        // 0 表示不限时
        if let Some(ms) = parse::<u64>(&lookup, "HERALD_HANDLER_TIMEOUT_MS")? {
            dispatch.handler_timeout = (ms > 0).then(|| Duration::from_millis(ms));
        }

        Ok(Self {
            routes_path: lookup("HERALD_ROUTES").map(PathBuf::from),
            export_path: lookup("HERALD_EXPORT_ROUTES").map(PathBuf::from),
            dispatch,
        })
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    lookup(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| anyhow::anyhow!("{e}"))
                .with_context(|| format!("invalid {key}: {raw}"))
        })
        .transpose()
}
