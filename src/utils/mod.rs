//! 工具函数模块

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use std::collections::BTreeMap;
use tonic::metadata::{KeyAndValueRef, MetadataMap};

/// 读取 ASCII metadata 值
pub fn metadata_value(metadata: &MetadataMap, key: &str) -> Option<String> {
    metadata
        .get(key)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

/// 将 metadata 转换为 key -> 值列表
///
/// 同名 key 的多个值按出现顺序保留；二进制（`-bin`）值以 base64 表示，
/// 无法按文本读取的 ASCII 值按字节有损转换。
pub fn metadata_to_map(metadata: &MetadataMap) -> BTreeMap<String, Vec<String>> {
    let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for entry in metadata.iter() {
        let (key, value) = match entry {
            KeyAndValueRef::Ascii(key, value) => {
                let value = match value.to_str() {
                    Ok(s) => s.to_string(),
                    Err(_) => String::from_utf8_lossy(value.as_encoded_bytes()).into_owned(),
                };
                (key.as_str(), value)
            }
            KeyAndValueRef::Binary(key, value) => {
                let value = match value.to_bytes() {
                    Ok(bytes) => STANDARD.encode(bytes),
                    Err(_) => String::from_utf8_lossy(value.as_encoded_bytes()).into_owned(),
                };
                (key.as_str(), value)
            }
        };
        map.entry(key.to_string()).or_default().push(value);
    }

    map
}
