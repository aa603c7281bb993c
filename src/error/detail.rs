//! 带结构化详情的错误
//!
//! 业务错误（例如校验失败的字段与原因）通过 [`DetailedError`] 包装后，
//! 分类器即可在日志中展开其详情，而无需了解具体类型。

use crate::log::{LogValuer, Value};
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use tonic::Status;

trait DetailSource: StdError + LogValuer + Send + Sync + 'static {}

impl<T> DetailSource for T where T: StdError + LogValuer + Send + Sync + 'static {}

/// 携带结构化日志详情的错误包装
#[derive(Clone)]
pub struct DetailedError {
    inner: Arc<dyn DetailSource>,
}

impl DetailedError {
    pub fn new<E>(err: E) -> Self
    where
        E: StdError + LogValuer + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(err),
        }
    }

    /// 结构化详情
    pub fn log_value(&self) -> Value {
        self.inner.log_value()
    }

    /// 转换为指定状态码的 `Status`，并保留自身作为 source
    pub fn into_status(self, code: tonic::Code) -> Status {
        let mut status = Status::new(code, self.inner.to_string());
        status.set_source(Arc::new(self));
        status
    }
}

impl fmt::Debug for DetailedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.inner, f)
    }
}

impl fmt::Display for DetailedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.inner, f)
    }
}

impl StdError for DetailedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source()
    }
}

/// 在错误链中查找结构化详情
pub(crate) fn find_details(err: &(dyn StdError + 'static)) -> Option<Value> {
    super::context::chain(err)
        .find_map(|e| e.downcast_ref::<DetailedError>())
        .map(DetailedError::log_value)
}
