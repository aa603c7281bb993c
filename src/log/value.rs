//! 结构化日志字段与值

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

/// 结构化日志值
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    I64(i64),
    U64(u64),
    Bool(bool),
    Duration(Duration),
    Json(serde_json::Value),
    /// 属性组，记录时作为嵌套对象输出
    Group(Vec<Field>),
}

impl Value {
    /// 使用 `Debug` 输出作为值（用于消息体）
    pub fn debug<T: fmt::Debug + ?Sized>(value: &T) -> Self {
        Value::Str(format!("{:?}", value))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::U64(v) => Some(*v),
            Value::I64(v) if *v >= 0 => Some(*v as u64),
            _ => None,
        }
    }

    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            Value::Duration(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&[Field]> {
        match self {
            Value::Group(fields) => Some(fields),
            _ => None,
        }
    }

    /// 在属性组中按 key 查找
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_group().and_then(|fields| find(fields, key))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::I64(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::U64(value)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::U64(value as u64)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<Duration> for Value {
    fn from(value: Duration) -> Self {
        Value::Duration(value)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        Value::Json(value)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Str(s) => serializer.serialize_str(s),
            Value::I64(v) => serializer.serialize_i64(*v),
            Value::U64(v) => serializer.serialize_u64(*v),
            Value::Bool(v) => serializer.serialize_bool(*v),
            // 毫秒，保留小数
            Value::Duration(d) => serializer.serialize_f64(d.as_secs_f64() * 1000.0),
            Value::Json(v) => v.serialize(serializer),
            Value::Group(fields) => Fields(fields).serialize(serializer),
        }
    }
}

/// 命名的结构化字段
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: Cow<'static, str>,
    pub value: Value,
}

impl Field {
    pub fn new(key: impl Into<Cow<'static, str>>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// 创建属性组字段
    pub fn group(key: impl Into<Cow<'static, str>>, fields: Vec<Field>) -> Self {
        Self::new(key, Value::Group(fields))
    }
}

/// 按 key 查找字段值（后写入的同名字段优先）
pub fn find<'a>(fields: &'a [Field], key: &str) -> Option<&'a Value> {
    fields.iter().rev().find(|f| f.key == key).map(|f| &f.value)
}

/// 字段切片的 JSON 对象序列化视图
pub struct Fields<'a>(pub &'a [Field]);

impl Serialize for Fields<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for field in self.0 {
            map.serialize_entry(field.key.as_ref(), &field.value)?;
        }
        map.end()
    }
}

/// 能够提供结构化日志值的类型
///
/// 错误类型需包装为 [`DetailedError`](crate::DetailedError)（或作为 `Status` 的 source）
/// 才会被分类器识别；handler 错误类型直接实现本 trait 不会产生任何详情。
/// 被识别时，返回 [`Value::Group`] 则其成员直接展开到 `error` 中，
/// 其他值嵌套在 `details` 字段下。
pub trait LogValuer {
    fn log_value(&self) -> Value;
}
