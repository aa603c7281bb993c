//! 进程级 tracing 初始化

use crate::config::{LogFormat, TelemetryConfig};
use crate::error::{LoggingError, Result};
use tracing_subscriber::EnvFilter;

/// 安装全局 tracing subscriber
///
/// 设置了 `RUST_LOG` 时以其为准，否则使用配置中的过滤指令。
/// 重复调用返回 [`LoggingError::Telemetry`]。
pub fn init_tracing(config: &TelemetryConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.filter)
            .map_err(|e| LoggingError::Telemetry(format!("invalid filter `{}`: {}", config.filter, e)))?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };

    result.map_err(|e| LoggingError::Telemetry(e.to_string()))
}
