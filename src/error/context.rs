//! 调用生命周期错误与流结束信号

use std::error::Error as StdError;
use std::io;
use thiserror::Error;
use tonic::Status;

/// 调用上下文生命周期错误
///
/// handler 在感知到调用被取消或超时时返回，分类器会将其映射为固定的单例。
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    #[error("context canceled")]
    Canceled,

    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// 流式连接错误
#[derive(Error, Debug)]
pub enum StreamError {
    /// 对端已无更多数据
    #[error("end of stream")]
    EndOfStream,

    #[error("{0}")]
    Status(#[source] Status),
}

impl StreamError {
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, StreamError::EndOfStream)
    }
}

impl From<Status> for StreamError {
    fn from(status: Status) -> Self {
        StreamError::Status(status)
    }
}

/// 遍历错误及其 source 链
pub fn chain<'a>(
    err: &'a (dyn StdError + 'static),
) -> impl Iterator<Item = &'a (dyn StdError + 'static)> {
    std::iter::successors(Some(err), |&e| e.source())
}

/// 判断错误链中是否包含流结束信号
pub fn is_end_of_stream(err: &(dyn StdError + 'static)) -> bool {
    chain(err).any(|e| {
        e.downcast_ref::<StreamError>()
            .is_some_and(StreamError::is_end_of_stream)
    })
}

/// 判断错误链中是否包含取消信号
pub(crate) fn is_canceled(err: &(dyn StdError + 'static)) -> bool {
    chain(err).any(|e| {
        matches!(e.downcast_ref::<ContextError>(), Some(ContextError::Canceled))
            || e.downcast_ref::<tokio::task::JoinError>()
                .is_some_and(|join| join.is_cancelled())
    })
}

/// 判断错误链中是否包含超时信号（上下文级或底层超时原语）
pub(crate) fn is_deadline_exceeded(err: &(dyn StdError + 'static)) -> bool {
    chain(err).any(|e| {
        matches!(
            e.downcast_ref::<ContextError>(),
            Some(ContextError::DeadlineExceeded)
        ) || e.is::<tokio::time::error::Elapsed>()
            || e.is::<tower::timeout::error::Elapsed>()
            || e.downcast_ref::<io::Error>()
                .is_some_and(|io| io.kind() == io::ErrorKind::TimedOut)
    })
}
