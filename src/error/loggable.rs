//! 错误分类
//!
//! 将任意错误归一化为带 gRPC 状态码的结构化视图，用于日志输出：
//! - 已携带 `Status` 的错误原样透传（状态码和消息不变）
//! - 取消 / 超时映射到固定的单例
//! - 其余错误归为 `Unknown`，消息保留原始文本

use super::code::CodeExt;
use super::context::{chain, is_canceled, is_deadline_exceeded};
use super::detail::find_details;
use crate::log::{Field, Value};
use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;
use tonic::{Code, Status};
use tracing::Level;

/// 预定义的上下文错误
#[derive(Debug)]
pub struct WellKnownError {
    code: Code,
    message: &'static str,
}

impl WellKnownError {
    pub fn code(&self) -> Code {
        self.code
    }

    pub fn message(&self) -> &'static str {
        self.message
    }
}

/// 请求取消
pub static CANCELED: WellKnownError = WellKnownError {
    code: Code::Cancelled,
    message: "request canceled",
};

/// 请求超时
pub static DEADLINE_EXCEEDED: WellKnownError = WellKnownError {
    code: Code::DeadlineExceeded,
    message: "request deadline exceeded",
};

/// 可记录的错误视图
#[derive(Clone, Copy)]
pub enum LoggableError<'a> {
    /// 已携带 gRPC 状态的错误
    Status(&'a Status),
    /// 预定义单例
    WellKnown(&'static WellKnownError),
    /// 无法识别的错误
    Unknown(&'a (dyn StdError + 'static)),
}

/// 对错误进行分类，`None` 表示没有错误
pub fn classify<'a>(err: Option<&'a (dyn StdError + 'static)>) -> Option<LoggableError<'a>> {
    err.map(LoggableError::new)
}

impl<'a> LoggableError<'a> {
    pub fn new(err: &'a (dyn StdError + 'static)) -> Self {
        if let Some(status) = chain(err).find_map(|e| e.downcast_ref::<Status>()) {
            return LoggableError::Status(status);
        }

        if is_canceled(err) {
            LoggableError::WellKnown(&CANCELED)
        } else if is_deadline_exceeded(err) {
            LoggableError::WellKnown(&DEADLINE_EXCEEDED)
        } else {
            LoggableError::Unknown(err)
        }
    }

    pub fn code(&self) -> Code {
        match self {
            LoggableError::Status(status) => status.code(),
            LoggableError::WellKnown(known) => known.code,
            LoggableError::Unknown(_) => Code::Unknown,
        }
    }

    pub fn message(&self) -> Cow<'a, str> {
        match *self {
            LoggableError::Status(status) => Cow::Borrowed(status.message()),
            LoggableError::WellKnown(known) => Cow::Borrowed(known.message),
            LoggableError::Unknown(err) => Cow::Owned(err.to_string()),
        }
    }

    /// 单例（仅取消 / 超时）
    pub fn well_known(&self) -> Option<&'static WellKnownError> {
        match *self {
            LoggableError::WellKnown(known) => Some(known),
            _ => None,
        }
    }

    /// 失败记录使用的日志级别
    pub fn level(&self) -> Level {
        self.code().log_level()
    }

    /// 原始错误：状态的 source，没有则为状态本身；单例没有原始错误
    fn origin(&self) -> Option<&'a (dyn StdError + 'static)> {
        match *self {
            LoggableError::Status(status) => {
                Some(status.source().unwrap_or(status as &(dyn StdError + 'static)))
            }
            LoggableError::WellKnown(_) => None,
            LoggableError::Unknown(err) => Some(err),
        }
    }

    /// 结构化表示：`code`、`message`，以及原始错误提供的详情
    pub fn log_value(&self) -> Value {
        let mut attrs = vec![
            Field::new("code", self.code().as_str()),
            Field::new("message", self.message().into_owned()),
        ];

        if let Some(details) = self.origin().and_then(find_details) {
            match details {
                Value::Group(fields) => attrs.extend(fields),
                other => attrs.push(Field::new("details", other)),
            }
        }

        Value::Group(attrs)
    }
}

impl fmt::Debug for LoggableError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggableError")
            .field("code", &self.code())
            .field("message", &self.message())
            .finish()
    }
}

impl fmt::Display for LoggableError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code().as_str(), self.message())
    }
}
