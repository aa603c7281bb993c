//! gRPC 日志拦截器模块
//!
//! 提供一元 / 流式调用的计时、脱敏与结构化日志

pub mod logging;
pub mod redact;
pub mod stream;

pub use logging::{Logged, LoggingInterceptor, LoggingInterceptorBuilder};
pub use redact::{DEFAULT_REDACT_HEADERS, REDACTED, Redactor, redact_headers, should_redact};
pub use stream::{LoggedStream, StreamStats};

use crate::log::Field;
use crate::rpc::{CallSpec, Peer};
use crate::utils::metadata_value;
use chrono::{DateTime, SecondsFormat, Utc};
use tonic::Extensions;
use tonic::metadata::MetadataMap;

/// 提供给上下文字段提取的调用信息
#[derive(Debug, Clone, Copy)]
pub struct CallInfo<'a> {
    pub spec: &'a CallSpec,
    pub peer: &'a Peer,
    pub metadata: &'a MetadataMap,
    pub extensions: &'a Extensions,
}

/// 从调用中提取额外日志字段
///
/// 每次调用执行一次，不得阻塞；没有字段时返回空列表。
pub trait ContextFields: Send + Sync {
    fn fields(&self, call: &CallInfo<'_>) -> Vec<Field>;
}

impl<F> ContextFields for F
where
    F: Fn(&CallInfo<'_>) -> Vec<Field> + Send + Sync,
{
    fn fields(&self, call: &CallInfo<'_>) -> Vec<Field> {
        self(call)
    }
}

/// 将指定 metadata 复制为日志字段
///
/// 字段名为 key 中的 `-` 替换为 `_`，例如 `x-request-id` -> `x_request_id`。
#[derive(Debug, Clone)]
pub struct MetadataFields {
    keys: Vec<String>,
}

impl MetadataFields {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(|k| k.into().to_lowercase()).collect(),
        }
    }

    /// 追踪相关 key：`x-request-id`、`x-trace-id`
    pub fn tracing() -> Self {
        Self::new(["x-request-id", "x-trace-id"])
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl ContextFields for MetadataFields {
    fn fields(&self, call: &CallInfo<'_>) -> Vec<Field> {
        self.keys
            .iter()
            .filter_map(|key| {
                metadata_value(call.metadata, key).map(|value| Field::new(key.replace('-', "_"), value))
            })
            .collect()
    }
}

/// 单次调用的上下文
#[derive(Debug, Clone)]
pub struct CallContext {
    pub service: String,
    pub method: String,
    pub protocol: String,
    pub addr: String,
    pub started_at: DateTime<Utc>,
    pub fields: Vec<Field>,
}

impl CallContext {
    pub fn new(call: &CallInfo<'_>, hook: Option<&dyn ContextFields>) -> Self {
        Self {
            service: call.spec.service().to_string(),
            method: call.spec.method().to_string(),
            protocol: call.peer.protocol.clone(),
            addr: call.peer.addr.clone(),
            started_at: Utc::now(),
            fields: hook.map(|hook| hook.fields(call)).unwrap_or_default(),
        }
    }

    /// 请求级 logger 的上下文字段
    pub fn logger_fields(&self) -> Vec<Field> {
        let mut fields = Vec::with_capacity(4 + self.fields.len());
        fields.push(Field::new("service", self.service.as_str()));
        fields.push(Field::new("method", self.method.as_str()));
        fields.push(Field::new("protocol", self.protocol.as_str()));
        fields.push(Field::new("addr", self.addr.as_str()));
        fields.extend(self.fields.iter().cloned());
        fields
    }

    /// 调用开始时间（RFC 3339，微秒精度），写入汇总记录
    pub fn start_time(&self) -> Field {
        Field::new(
            "start_time",
            self.started_at.to_rfc3339_opts(SecondsFormat::Micros, true),
        )
    }
}
