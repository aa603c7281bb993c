//! 错误处理模块
//!
//! 包含 crate 自身的错误类型，以及用于日志的错误分类

pub mod code;
pub mod context;
pub mod detail;
pub mod loggable;

pub use code::CodeExt;
pub use context::{ContextError, StreamError, is_end_of_stream};
pub use detail::DetailedError;
pub use loggable::{CANCELED, DEADLINE_EXCEEDED, LoggableError, WellKnownError, classify};

use std::path::PathBuf;
use thiserror::Error;

/// crate 错误类型
#[derive(Error, Debug)]
pub enum LoggingError {
    /// 过程标识不是 `/service/method` 形式
    #[error("invalid procedure `{0}`: expected `/service/method`")]
    InvalidProcedure(String),

    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to initialize tracing: {0}")]
    Telemetry(String),
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, LoggingError>;
