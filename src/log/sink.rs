//! 日志输出端
//!
//! 拦截器只依赖 [`LogSink`]，默认实现转发到 `tracing`。

use super::value::{Field, Fields, Value};
use chrono::{DateTime, Utc};
use tracing::Level;

/// 日志 target，便于在 `EnvFilter` 中单独控制
pub const TARGET: &str = "flare_rpc_logging";

/// 一条结构化日志记录
#[derive(Debug, Clone)]
pub struct LogRecord<'a> {
    pub level: Level,
    pub message: &'a str,
    pub fields: &'a [Field],
    pub timestamp: DateTime<Utc>,
}

/// 日志输出端
///
/// 实现必须支持多个调用并发写入。
pub trait LogSink: Send + Sync {
    /// 指定级别是否会被输出
    fn enabled(&self, level: Level) -> bool;

    /// 输出一条记录
    fn log(&self, record: &LogRecord<'_>);
}

/// 丢弃所有记录的输出端
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl LogSink for NoopSink {
    fn enabled(&self, _level: Level) -> bool {
        false
    }

    fn log(&self, _record: &LogRecord<'_>) {}
}

/// 转发到 `tracing` 的输出端
///
/// 固定字段（调用上下文、耗时、大小、消息计数、错误码）作为独立的 tracing 字段输出，
/// 其余字段（上下文扩展、metadata、消息体、错误详情）渲染为 JSON 放在 `extra` 中。
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TracingSink {
    pub fn new() -> Self {
        Self
    }
}

/// 一条记录拆分后的 tracing 字段
#[derive(Debug, Default)]
struct TracingFields<'a> {
    service: Option<&'a str>,
    method: Option<&'a str>,
    protocol: Option<&'a str>,
    addr: Option<&'a str>,
    start_time: Option<&'a str>,
    duration_ms: Option<u64>,
    duration_us: Option<u64>,
    request_size: Option<u64>,
    response_size: Option<u64>,
    sent: Option<u64>,
    received: Option<u64>,
    number: Option<u64>,
    size: Option<u64>,
    error_code: Option<&'a str>,
    error_message: Option<&'a str>,
    extra: Vec<Field>,
}

impl<'a> TracingFields<'a> {
    fn split(fields: &'a [Field]) -> Self {
        let mut out = Self::default();

        for field in fields {
            let value = &field.value;
            match (&*field.key, value) {
                ("service", Value::Str(s)) => out.service = Some(s.as_str()),
                ("method", Value::Str(s)) => out.method = Some(s.as_str()),
                ("protocol", Value::Str(s)) => out.protocol = Some(s.as_str()),
                ("addr", Value::Str(s)) => out.addr = Some(s.as_str()),
                ("start_time", Value::Str(s)) => out.start_time = Some(s.as_str()),
                ("duration", Value::Duration(d)) => {
                    out.duration_ms = Some(saturate(d.as_millis()));
                    out.duration_us = Some(saturate(d.as_micros()));
                }
                ("request_size", v) if v.as_u64().is_some() => out.request_size = v.as_u64(),
                ("response_size", v) if v.as_u64().is_some() => out.response_size = v.as_u64(),
                ("number", v) if v.as_u64().is_some() => out.number = v.as_u64(),
                ("size", v) if v.as_u64().is_some() => out.size = v.as_u64(),
                ("messages", Value::Group(group)) => {
                    for member in group {
                        match &*member.key {
                            "sent" => out.sent = member.value.as_u64(),
                            "received" => out.received = member.value.as_u64(),
                            _ => {}
                        }
                    }
                }
                ("error", Value::Group(group)) => {
                    let mut details = Vec::new();
                    for member in group {
                        match (&*member.key, &member.value) {
                            ("code", Value::Str(s)) => out.error_code = Some(s.as_str()),
                            ("message", Value::Str(s)) => out.error_message = Some(s.as_str()),
                            _ => details.push(member.clone()),
                        }
                    }
                    if !details.is_empty() {
                        out.extra.push(Field::group("error", details));
                    }
                }
                _ => out.extra.push(field.clone()),
            }
        }

        out
    }

    fn extra_json(&self) -> Option<String> {
        if self.extra.is_empty() {
            return None;
        }
        Some(match serde_json::to_string(&Fields(&self.extra)) {
            Ok(rendered) => rendered,
            Err(err) => format!("{{\"render_error\":\"{}\"}}", err),
        })
    }
}

fn saturate(value: u128) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

// tracing 宏要求级别为常量
macro_rules! emit {
    ($level:expr, $f:expr, $extra:expr, $message:expr) => {
        tracing::event!(
            target: TARGET,
            $level,
            service = $f.service,
            method = $f.method,
            protocol = $f.protocol,
            addr = $f.addr,
            start_time = $f.start_time,
            duration_ms = $f.duration_ms,
            duration_us = $f.duration_us,
            request_size = $f.request_size,
            response_size = $f.response_size,
            messages.sent = $f.sent,
            messages.received = $f.received,
            number = $f.number,
            size = $f.size,
            error.code = $f.error_code,
            error.message = $f.error_message,
            extra = $extra,
            "{}",
            $message
        )
    };
}

impl LogSink for TracingSink {
    fn enabled(&self, level: Level) -> bool {
        match level {
            Level::ERROR => tracing::enabled!(target: TARGET, Level::ERROR),
            Level::WARN => tracing::enabled!(target: TARGET, Level::WARN),
            Level::INFO => tracing::enabled!(target: TARGET, Level::INFO),
            Level::DEBUG => tracing::enabled!(target: TARGET, Level::DEBUG),
            _ => tracing::enabled!(target: TARGET, Level::TRACE),
        }
    }

    fn log(&self, record: &LogRecord<'_>) {
        let fields = TracingFields::split(record.fields);
        let extra = fields.extra_json();
        let extra = extra.as_deref();
        let message = record.message;

        match record.level {
            Level::ERROR => emit!(Level::ERROR, fields, extra, message),
            Level::WARN => emit!(Level::WARN, fields, extra, message),
            Level::INFO => emit!(Level::INFO, fields, extra, message),
            Level::DEBUG => emit!(Level::DEBUG, fields, extra, message),
            _ => emit!(Level::TRACE, fields, extra, message),
        }
    }
}
