//! 日志初始化
//!
//! 所有层通过 `tracing` 输出日志；`log` 生态的记录经 `tracing-log` 桥接。
//! 过滤规则读取 `RUST_LOG`，未设置时为 `info`。

use std::error::Error;
use tracing_subscriber::EnvFilter;

/// 默认过滤规则
pub const DEFAULT_FILTER: &str = "info";

/// 安装全局日志订阅者（重复调用时静默忽略）
pub fn init_logger() {
    if let Err(e) = try_init_logger() {
        tracing::debug!("Logger already initialized: {}", e);
    }
}

/// 安装全局日志订阅者
///
/// # Errors
///
/// 全局订阅者或 `log` 桥接已经安装时返回错误。
pub fn try_init_logger() -> Result<(), Box<dyn Error + Send + Sync>> {
    tracing_log::LogTracer::init()?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
