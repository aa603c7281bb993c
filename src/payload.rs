//! 消息体大小估算
//!
//! 经过拦截器的消息需实现 [`Payload`]。大小为尽力估算，
//! 返回 `None` 表示未知（与 0 不同），日志中会省略对应字段。

use bytes::Bytes;
use std::fmt;

/// 可被拦截器记录的消息体
pub trait Payload: fmt::Debug + Send {
    /// 估算的消息体大小（字节）
    fn payload_size(&self) -> Option<usize> {
        None
    }
}

/// protobuf 编码后的大小
pub fn proto_size<M: prost::Message>(message: &M) -> Option<usize> {
    Some(message.encoded_len())
}

/// 为 prost 生成的消息类型实现 [`Payload`]，大小取编码长度
///
/// ```rust,ignore
/// flare_rpc_logging::impl_proto_payload!(SendMessageRequest, SendMessageResponse);
/// ```
#[macro_export]
macro_rules! impl_proto_payload {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::payload::Payload for $ty {
                fn payload_size(&self) -> ::std::option::Option<usize> {
                    $crate::payload::proto_size(self)
                }
            }
        )+
    };
}

impl Payload for () {
    fn payload_size(&self) -> Option<usize> {
        Some(0)
    }
}

impl Payload for Vec<u8> {
    fn payload_size(&self) -> Option<usize> {
        Some(self.len())
    }
}

impl Payload for Bytes {
    fn payload_size(&self) -> Option<usize> {
        Some(self.len())
    }
}

impl Payload for String {
    fn payload_size(&self) -> Option<usize> {
        Some(self.len())
    }
}

impl Payload for &'static str {
    fn payload_size(&self) -> Option<usize> {
        Some(self.len())
    }
}

impl<T: Payload> Payload for Option<T> {
    fn payload_size(&self) -> Option<usize> {
        match self {
            Some(inner) => inner.payload_size(),
            None => Some(0),
        }
    }
}

impl<T: Payload + ?Sized> Payload for Box<T> {
    fn payload_size(&self) -> Option<usize> {
        (**self).payload_size()
    }
}
