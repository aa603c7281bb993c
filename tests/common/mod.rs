//! 测试公共工具
#![allow(dead_code)]

use async_trait::async_trait;
use flare_rpc_logging::log::find;
use flare_rpc_logging::{
    CallSpec, Field, LogRecord, LogSink, Peer, StreamError, StreamingConn, Value,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tonic::metadata::MetadataMap;
use tonic::{Extensions, Status};
use tracing::Level;
use tracing::level_filters::LevelFilter;

#[derive(Clone, PartialEq, prost::Message)]
pub struct Ping {
    #[prost(string, tag = "1")]
    pub text: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Pong {
    #[prost(string, tag = "1")]
    pub text: String,
    #[prost(uint32, tag = "2")]
    pub seq: u32,
}

flare_rpc_logging::impl_proto_payload!(Ping, Pong);

/// 无法估算大小的消息体
#[derive(Debug, Clone, PartialEq)]
pub struct Opaque(pub u32);

impl flare_rpc_logging::Payload for Opaque {}

pub fn ping(text: &str) -> Ping {
    Ping {
        text: text.to_string(),
    }
}

pub fn pong(text: &str, seq: u32) -> Pong {
    Pong {
        text: text.to_string(),
        seq,
    }
}

/// 捕获的一条日志
#[derive(Debug, Clone)]
pub struct Captured {
    pub level: Level,
    pub message: String,
    pub fields: Vec<Field>,
}

impl Captured {
    pub fn get(&self, key: &str) -> Option<&Value> {
        find(&self.fields, key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// 内存日志输出端
pub struct MemorySink {
    filter: LevelFilter,
    records: Mutex<Vec<Captured>>,
}

impl MemorySink {
    pub fn new(filter: LevelFilter) -> Arc<Self> {
        Arc::new(Self {
            filter,
            records: Mutex::new(Vec::new()),
        })
    }

    pub fn records(&self) -> Vec<Captured> {
        self.records.lock().unwrap().clone()
    }

    pub fn with_message(&self, message: &str) -> Vec<Captured> {
        self.records()
            .into_iter()
            .filter(|r| r.message == message)
            .collect()
    }

    /// 汇总记录（info 及以上）
    pub fn summaries(&self) -> Vec<Captured> {
        self.records()
            .into_iter()
            .filter(|r| r.level <= Level::INFO)
            .collect()
    }
}

impl LogSink for MemorySink {
    fn enabled(&self, level: Level) -> bool {
        self.filter >= level
    }

    fn log(&self, record: &LogRecord<'_>) {
        self.records.lock().unwrap().push(Captured {
            level: record.level,
            message: record.message.to_string(),
            fields: record.fields.to_vec(),
        });
    }
}

/// 可编排的流式连接
pub struct MockConn {
    pub spec: CallSpec,
    pub peer: Peer,
    pub request_metadata: MetadataMap,
    pub response_metadata: MetadataMap,
    pub extensions: Extensions,
    pub inbound: VecDeque<Result<Ping, Status>>,
    pub sent: Vec<Pong>,
    pub fail_sends: bool,
}

impl MockConn {
    pub fn new(inbound: Vec<Result<Ping, Status>>) -> Self {
        Self {
            spec: CallSpec::new("/chat.v1.ChatService/Talk").unwrap(),
            peer: Peer::new("grpc", "10.0.0.7:51234"),
            request_metadata: MetadataMap::new(),
            response_metadata: MetadataMap::new(),
            extensions: Extensions::new(),
            inbound: inbound.into(),
            sent: Vec::new(),
            fail_sends: false,
        }
    }

    pub fn failing_sends(mut self) -> Self {
        self.fail_sends = true;
        self
    }
}

#[async_trait]
impl StreamingConn for MockConn {
    type Inbound = Ping;
    type Outbound = Pong;

    fn spec(&self) -> &CallSpec {
        &self.spec
    }

    fn peer(&self) -> &Peer {
        &self.peer
    }

    fn request_metadata(&self) -> &MetadataMap {
        &self.request_metadata
    }

    fn response_metadata(&mut self) -> &mut MetadataMap {
        &mut self.response_metadata
    }

    fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    async fn send(&mut self, message: Pong) -> Result<(), StreamError> {
        if self.fail_sends {
            return Err(StreamError::Status(Status::unavailable("peer went away")));
        }
        self.sent.push(message);
        Ok(())
    }

    async fn receive(&mut self) -> Result<Ping, StreamError> {
        match self.inbound.pop_front() {
            Some(Ok(message)) => Ok(message),
            Some(Err(status)) => Err(StreamError::Status(status)),
            None => Err(StreamError::EndOfStream),
        }
    }
}
