use super::redact::Redactor;
use super::stream::LoggedStream;
use super::{CallContext, CallInfo, ContextFields, MetadataFields};
use crate::config::LoggingConfig;
use crate::error::{LoggableError, is_end_of_stream};
use crate::log::{Field, LogSink, NoopSink, RequestLogger, TracingSink, Value};
use crate::payload::Payload;
use crate::rpc::{StreamingConn, StreamingHandler, UnaryHandler, UnaryRequest};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tonic::Response;
use tracing::Level;

/// 日志拦截器
///
/// 对每次调用输出一条汇总记录（成功或失败），debug 级别下额外记录
/// 脱敏后的 metadata 与消息体。拦截器只观察，不修改请求、响应或错误。
#[derive(Clone)]
pub struct LoggingInterceptor {
    sink: Arc<dyn LogSink>,
    redactor: Arc<Redactor>,
    context_fields: Option<Arc<dyn ContextFields>>,
}

impl LoggingInterceptor {
    pub fn builder() -> LoggingInterceptorBuilder {
        LoggingInterceptorBuilder::new()
    }

    /// 根据配置创建，日志输出到 `tracing`
    pub fn from_config(config: &LoggingConfig) -> Self {
        let mut builder = Self::builder()
            .sink(Arc::new(TracingSink::new()))
            .redact_headers(config.redact_headers.iter());

        let metadata_fields = MetadataFields::new(config.context_headers.iter().cloned());
        if !metadata_fields.is_empty() {
            builder = builder.context_fields(metadata_fields);
        }

        builder.build()
    }

    pub fn redactor(&self) -> &Redactor {
        &self.redactor
    }

    /// 包装 handler，使其每次调用都经过本拦截器
    pub fn wrap<H>(&self, handler: H) -> Logged<H> {
        Logged {
            interceptor: self.clone(),
            inner: handler,
        }
    }

    /// 创建请求级 logger，同时返回汇总记录使用的开始时间字段
    fn request_logger(&self, call: &CallInfo<'_>) -> (RequestLogger, Field) {
        let context = CallContext::new(call, self.context_fields.as_deref());
        let logger = RequestLogger::new(self.sink.clone(), context.logger_fields());
        (logger, context.start_time())
    }

    /// 执行一元调用并记录日志
    pub async fn unary<Req, Resp, H>(
        &self,
        request: UnaryRequest<Req>,
        handler: &H,
    ) -> Result<Response<Resp>, H::Error>
    where
        Req: Payload + 'static,
        Resp: Payload + 'static,
        H: UnaryHandler<Req, Resp> + ?Sized,
    {
        let (logger, start_time) = self.request_logger(&CallInfo {
            spec: request.spec(),
            peer: request.peer(),
            metadata: request.metadata(),
            extensions: request.extensions(),
        });

        if logger.enabled(Level::DEBUG) {
            logger.debug(
                "request started",
                vec![
                    Field::new("request", Value::debug(request.message())),
                    Field::new("headers", self.redactor.metadata_value(request.metadata())),
                ],
            );
        }

        // 请求所有权交给 handler，大小需提前计算
        let request_size = request.message().payload_size();

        let start = Instant::now();
        let result = handler.call(request).await;
        let duration = start.elapsed();

        let mut fields = vec![start_time, Field::new("duration", duration)];
        if let Some(size) = request_size {
            fields.push(Field::new("request_size", size));
        }

        match &result {
            Ok(response) => {
                if logger.enabled(Level::DEBUG) {
                    logger.debug(
                        "response completed",
                        vec![
                            Field::new("response", Value::debug(response.get_ref())),
                            Field::new("headers", self.redactor.metadata_value(response.metadata())),
                        ],
                    );
                }

                if let Some(size) = response.get_ref().payload_size() {
                    fields.push(Field::new("response_size", size));
                }
                logger.info("request completed", fields);
            }
            Err(err) => {
                let loggable = LoggableError::new(err);
                fields.push(Field::new("error", loggable.log_value()));
                logger.log(loggable.level(), "request failed", fields);
            }
        }

        result
    }

    /// 执行流式调用并记录日志
    pub async fn streaming<C, H>(&self, conn: &mut C, handler: &H) -> Result<(), H::Error>
    where
        C: StreamingConn + ?Sized,
        H: StreamingHandler<C::Inbound, C::Outbound> + ?Sized,
    {
        let (logger, start_time) = self.request_logger(&CallInfo {
            spec: conn.spec(),
            peer: conn.peer(),
            metadata: conn.request_metadata(),
            extensions: conn.extensions(),
        });

        if logger.enabled(Level::DEBUG) {
            logger.debug(
                "stream started",
                vec![Field::new(
                    "headers",
                    self.redactor.metadata_value(conn.request_metadata()),
                )],
            );
        }

        let mut stream = LoggedStream::new(conn, logger.clone());

        let start = Instant::now();
        let result = handler.call(&mut stream).await;
        let duration = start.elapsed();

        let stats = stream.stats();
        let mut fields = vec![
            start_time,
            Field::group(
                "messages",
                vec![
                    Field::new("sent", stats.sent),
                    Field::new("received", stats.received),
                ],
            ),
            Field::new("duration", duration),
        ];

        match &result {
            Err(err) if !is_end_of_stream(err) => {
                let loggable = LoggableError::new(err);
                fields.push(Field::new("error", loggable.log_value()));
                logger.log(loggable.level(), "stream failed", fields);
            }
            _ => logger.info("stream completed", fields),
        }

        result
    }
}

impl Default for LoggingInterceptor {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// 日志拦截器构建器
pub struct LoggingInterceptorBuilder {
    sink: Option<Arc<dyn LogSink>>,
    redact_headers: Vec<String>,
    context_fields: Option<Arc<dyn ContextFields>>,
}

impl LoggingInterceptorBuilder {
    pub fn new() -> Self {
        Self {
            sink: None,
            redact_headers: Vec::new(),
            context_fields: None,
        }
    }

    /// 日志输出端，未设置时不输出任何日志
    pub fn sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// 追加需要脱敏的 metadata 名称（与内置名称合并）
    pub fn redact_headers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.redact_headers
            .extend(names.into_iter().map(|name| name.as_ref().to_string()));
        self
    }

    /// 上下文字段提取
    pub fn context_fields<F>(mut self, hook: F) -> Self
    where
        F: ContextFields + 'static,
    {
        self.context_fields = Some(Arc::new(hook));
        self
    }

    pub fn build(self) -> LoggingInterceptor {
        LoggingInterceptor {
            sink: self.sink.unwrap_or_else(|| Arc::new(NoopSink)),
            redactor: Arc::new(Redactor::new(self.redact_headers)),
            context_fields: self.context_fields,
        }
    }
}

impl Default for LoggingInterceptorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 经过日志拦截器的 handler
pub struct Logged<H> {
    interceptor: LoggingInterceptor,
    inner: H,
}

impl<H> Logged<H> {
    pub fn inner(&self) -> &H {
        &self.inner
    }
}

#[async_trait]
impl<Req, Resp, H> UnaryHandler<Req, Resp> for Logged<H>
where
    Req: Payload + 'static,
    Resp: Payload + 'static,
    H: UnaryHandler<Req, Resp>,
{
    type Error = H::Error;

    async fn call(&self, request: UnaryRequest<Req>) -> Result<Response<Resp>, H::Error> {
        self.interceptor.unary(request, &self.inner).await
    }
}

#[async_trait]
impl<In, Out, H> StreamingHandler<In, Out> for Logged<H>
where
    In: Payload + 'static,
    Out: Payload + 'static,
    H: StreamingHandler<In, Out>,
{
    type Error = H::Error;

    async fn call(
        &self,
        stream: &mut dyn StreamingConn<Inbound = In, Outbound = Out>,
    ) -> Result<(), H::Error> {
        self.interceptor.streaming(stream, &self.inner).await
    }
}
