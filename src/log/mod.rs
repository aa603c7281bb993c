//! 结构化日志模块
//!
//! 提供日志字段/值模型、输出端抽象以及请求级 logger

pub mod sink;
pub mod value;

pub use sink::{LogRecord, LogSink, NoopSink, TARGET, TracingSink};
pub use value::{Field, Fields, LogValuer, Value, find};

use std::sync::Arc;
use tracing::Level;

/// 请求级 logger
///
/// 携带调用上下文字段（service、method、peer 等），
/// 每条记录都会先输出这些字段，再输出记录自身的字段。
#[derive(Clone)]
pub struct RequestLogger {
    sink: Arc<dyn LogSink>,
    context: Arc<[Field]>,
}

impl RequestLogger {
    pub fn new(sink: Arc<dyn LogSink>, context: Vec<Field>) -> Self {
        Self {
            sink,
            context: context.into(),
        }
    }

    /// 上下文字段
    pub fn context(&self) -> &[Field] {
        &self.context
    }

    #[inline]
    pub fn enabled(&self, level: Level) -> bool {
        self.sink.enabled(level)
    }

    pub fn log(&self, level: Level, message: &str, fields: Vec<Field>) {
        if !self.sink.enabled(level) {
            return;
        }

        let mut all = Vec::with_capacity(self.context.len() + fields.len());
        all.extend(self.context.iter().cloned());
        all.extend(fields);

        self.sink.log(&LogRecord {
            level,
            message,
            fields: &all,
            timestamp: chrono::Utc::now(),
        });
    }

    pub fn debug(&self, message: &str, fields: Vec<Field>) {
        self.log(Level::DEBUG, message, fields);
    }

    pub fn info(&self, message: &str, fields: Vec<Field>) {
        self.log(Level::INFO, message, fields);
    }

    pub fn warn(&self, message: &str, fields: Vec<Field>) {
        self.log(Level::WARN, message, fields);
    }

    pub fn error(&self, message: &str, fields: Vec<Field>) {
        self.log(Level::ERROR, message, fields);
    }
}

impl std::fmt::Debug for RequestLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestLogger")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}
