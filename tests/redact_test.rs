//! metadata 脱敏测试

use flare_rpc_logging::interceptor::{REDACTED, should_redact};
use flare_rpc_logging::{Redactor, redact_headers};
use std::collections::{BTreeMap, HashSet};
use tonic::metadata::{MetadataMap, MetadataValue};

fn headers(pairs: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
    pairs
        .iter()
        .map(|(k, vs)| (k.to_string(), vs.iter().map(|v| v.to_string()).collect()))
        .collect()
}

fn set(names: &[&str]) -> HashSet<String> {
    names.iter().map(|n| n.to_string()).collect()
}

#[test]
fn test_sensitive_keys_regardless_of_case() {
    let input = headers(&[
        ("Authorization", &["Bearer abc"]),
        ("X-My-Token", &["t1", "t2"]),
        ("content-type", &["application/grpc"]),
    ]);

    let output = redact_headers(&input, &set(&["authorization", "token"]));

    assert_eq!(output["Authorization"], [REDACTED]);
    // 多个值合并为一个替换值
    assert_eq!(output["X-My-Token"], [REDACTED]);
    assert_eq!(output["content-type"], ["application/grpc"]);
}

#[test]
fn test_input_is_not_mutated() {
    let input = headers(&[("authorization", &["Bearer abc"]), ("accept", &["*/*"])]);
    let before = input.clone();

    let output = redact_headers(&input, &set(&["authorization"]));

    assert_eq!(input, before);
    assert_eq!(output.len(), input.len());
    assert_eq!(output["accept"], input["accept"]);
}

#[test]
fn test_builtin_patterns() {
    let empty = HashSet::new();

    assert!(should_redact("authorization", &empty));
    assert!(should_redact("x-client-secret", &empty));
    assert!(should_redact("DB-Password", &empty));
    assert!(should_redact("refresh_token", &empty));
    assert!(!should_redact("x-request-id", &empty));
    assert!(!should_redact("user-agent", &empty));
}

#[test]
fn test_custom_names_case_insensitive() {
    assert!(should_redact("X-Api-Key", &set(&["x-api-key"])));
    assert!(should_redact("x-api-key", &set(&["X-API-KEY"])));
    assert!(!should_redact("x-api-version", &set(&["x-api-key"])));
}

#[test]
fn test_empty_headers() {
    let output = redact_headers(&BTreeMap::new(), &set(&["authorization"]));
    assert!(output.is_empty());
}

#[test]
fn test_redactor_merges_defaults() {
    let redactor = Redactor::new(["Cookie"]);

    assert!(redactor.sensitive().contains("authorization"));
    assert!(redactor.sensitive().contains("token"));
    assert!(redactor.sensitive().contains("cookie"));
    assert_eq!(Redactor::default().sensitive().len(), 2);
}

#[test]
fn test_redact_metadata() {
    let mut metadata = MetadataMap::new();
    metadata.insert("authorization", "Bearer abc".parse().unwrap());
    metadata.insert("cookie", "session=1".parse().unwrap());
    metadata.append("x-tag", "a".parse().unwrap());
    metadata.append("x-tag", "b".parse().unwrap());
    metadata.insert_bin("trace-bin", MetadataValue::from_bytes(b"\x01\x02"));

    let output = Redactor::new(["cookie"]).redact_metadata(&metadata);

    assert_eq!(output["authorization"], [REDACTED]);
    assert_eq!(output["cookie"], [REDACTED]);
    assert_eq!(output["x-tag"], ["a", "b"]);
    assert_eq!(output["trace-bin"], ["AQI="]);
}
