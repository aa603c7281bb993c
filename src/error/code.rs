//! gRPC 状态码扩展
//!
//! 为 `tonic::Code` 提供稳定的日志名称和严重程度划分

use tonic::Code;
use tracing::Level;

/// `tonic::Code` 扩展 trait
pub trait CodeExt {
    /// 稳定的 snake_case 名称，用于日志字段
    fn as_str(&self) -> &'static str;

    /// 是否属于服务端故障（internal 类错误）
    ///
    /// 按状态码序号与 `Internal` 比较，`Unknown` 视为服务端故障。
    fn is_server_fault(&self) -> bool;

    /// 失败时使用的日志级别
    fn log_level(&self) -> Level {
        if self.is_server_fault() {
            Level::ERROR
        } else {
            Level::WARN
        }
    }
}

impl CodeExt for Code {
    fn as_str(&self) -> &'static str {
        match self {
            Code::Ok => "ok",
            Code::Cancelled => "canceled",
            Code::Unknown => "unknown",
            Code::InvalidArgument => "invalid_argument",
            Code::DeadlineExceeded => "deadline_exceeded",
            Code::NotFound => "not_found",
            Code::AlreadyExists => "already_exists",
            Code::PermissionDenied => "permission_denied",
            Code::ResourceExhausted => "resource_exhausted",
            Code::FailedPrecondition => "failed_precondition",
            Code::Aborted => "aborted",
            Code::OutOfRange => "out_of_range",
            Code::Unimplemented => "unimplemented",
            Code::Internal => "internal",
            Code::Unavailable => "unavailable",
            Code::DataLoss => "data_loss",
            Code::Unauthenticated => "unauthenticated",
        }
    }

    fn is_server_fault(&self) -> bool {
        *self == Code::Unknown || (*self as i32) >= (Code::Internal as i32)
    }
}
