//! metadata 脱敏

use crate::log::Value;
use crate::utils::metadata_to_map;
use std::collections::{BTreeMap, HashSet};
use tonic::metadata::MetadataMap;

/// 脱敏后的替换值
pub const REDACTED: &str = "[REDACTED]";

/// 默认需要脱敏的 key
pub const DEFAULT_REDACT_HEADERS: &[&str] = &["authorization", "token"];

/// 对 key -> 值列表进行脱敏
///
/// 命中 `sensitive` 或内置规则时整组值替换为单个 [`REDACTED`]，
/// 其余 key 原样复制；输入不会被修改。
pub fn redact_headers(
    headers: &BTreeMap<String, Vec<String>>,
    sensitive: &HashSet<String>,
) -> BTreeMap<String, Vec<String>> {
    headers
        .iter()
        .map(|(key, values)| {
            if should_redact(key, sensitive) {
                (key.clone(), vec![REDACTED.to_string()])
            } else {
                (key.clone(), values.clone())
            }
        })
        .collect()
}

/// 判断 key 是否需要脱敏（大小写不敏感）
pub fn should_redact(key: &str, sensitive: &HashSet<String>) -> bool {
    let key = key.to_lowercase();

    sensitive.contains(&key)
        || sensitive.iter().any(|name| name.eq_ignore_ascii_case(&key))
        || key == "authorization"
        || key.contains("token")
        || key.contains("secret")
        || key.contains("password")
}

/// metadata 脱敏器
///
/// 敏感名称在构造时统一转为小写，构造后不再变化。
#[derive(Debug, Clone)]
pub struct Redactor {
    sensitive: HashSet<String>,
}

impl Redactor {
    /// 默认名称之外追加自定义名称
    pub fn new<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let sensitive = DEFAULT_REDACT_HEADERS
            .iter()
            .map(|name| name.to_string())
            .chain(extra.into_iter().map(|name| name.as_ref().to_lowercase()))
            .collect();
        Self { sensitive }
    }

    pub fn sensitive(&self) -> &HashSet<String> {
        &self.sensitive
    }

    pub fn redact(&self, headers: &BTreeMap<String, Vec<String>>) -> BTreeMap<String, Vec<String>> {
        redact_headers(headers, &self.sensitive)
    }

    pub fn redact_metadata(&self, metadata: &MetadataMap) -> BTreeMap<String, Vec<String>> {
        self.redact(&metadata_to_map(metadata))
    }

    /// 脱敏后的 metadata 日志值
    pub fn metadata_value(&self, metadata: &MetadataMap) -> Value {
        let redacted = self.redact_metadata(metadata);
        Value::Json(serde_json::to_value(redacted).unwrap_or_default())
    }
}

impl Default for Redactor {
    fn default() -> Self {
        Self::new(std::iter::empty::<&str>())
    }
}
