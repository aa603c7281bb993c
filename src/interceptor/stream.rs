//! 流式连接计数与日志

use crate::error::StreamError;
use crate::log::{Field, RequestLogger, Value};
use crate::payload::Payload;
use crate::rpc::{CallSpec, Peer, StreamingConn};
use async_trait::async_trait;
use tonic::Extensions;
use tonic::metadata::MetadataMap;
use tracing::Level;

/// 单次流式调用的消息计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub sent: u64,
    pub received: u64,
}

/// 记录收发消息的流式连接包装
///
/// 先委托底层连接，成功后才计数并输出 debug 记录；失败原样返回。
pub struct LoggedStream<'a, C: ?Sized> {
    inner: &'a mut C,
    logger: RequestLogger,
    stats: StreamStats,
    debug_enabled: bool,
}

impl<'a, C> LoggedStream<'a, C>
where
    C: StreamingConn + ?Sized,
{
    pub fn new(inner: &'a mut C, logger: RequestLogger) -> Self {
        // 每个连接只检查一次 debug 级别
        let debug_enabled = logger.enabled(Level::DEBUG);
        Self {
            inner,
            logger,
            stats: StreamStats::default(),
            debug_enabled,
        }
    }

    pub fn stats(&self) -> StreamStats {
        self.stats
    }
}

fn message_fields(number: u64, size: Option<usize>, key: &'static str, content: Value) -> Vec<Field> {
    let mut fields = vec![Field::new("number", number)];
    if let Some(size) = size {
        fields.push(Field::new("size", size));
    }
    fields.push(Field::new(key, content));
    fields
}

#[async_trait]
impl<'a, C> StreamingConn for LoggedStream<'a, C>
where
    C: StreamingConn + ?Sized,
{
    type Inbound = C::Inbound;
    type Outbound = C::Outbound;

    fn spec(&self) -> &CallSpec {
        self.inner.spec()
    }

    fn peer(&self) -> &Peer {
        self.inner.peer()
    }

    fn request_metadata(&self) -> &MetadataMap {
        self.inner.request_metadata()
    }

    fn response_metadata(&mut self) -> &mut MetadataMap {
        self.inner.response_metadata()
    }

    fn extensions(&self) -> &Extensions {
        self.inner.extensions()
    }

    async fn send(&mut self, message: Self::Outbound) -> Result<(), StreamError> {
        // 消息发送后所有权转移，debug 内容需提前取出
        let captured = self
            .debug_enabled
            .then(|| (message.payload_size(), Value::debug(&message)));

        self.inner.send(message).await?;
        self.stats.sent += 1;

        if let Some((size, content)) = captured {
            self.logger.debug(
                "stream message sent",
                message_fields(self.stats.sent, size, "response", content),
            );
        }
        Ok(())
    }

    async fn receive(&mut self) -> Result<Self::Inbound, StreamError> {
        let message = self.inner.receive().await?;
        self.stats.received += 1;

        if self.debug_enabled {
            self.logger.debug(
                "stream message received",
                message_fields(
                    self.stats.received,
                    message.payload_size(),
                    "receive",
                    Value::debug(&message),
                ),
            );
        }
        Ok(message)
    }
}
