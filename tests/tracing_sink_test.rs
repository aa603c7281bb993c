//! tracing 输出端字段测试
//!
//! 使用线程级 subscriber 捕获 JSON 输出，检查固定字段是否作为独立字段输出。

mod common;

use async_trait::async_trait;
use common::{MockConn, Ping, Pong, ping, pong};
use flare_rpc_logging::{
    CallSpec, DetailedError, Field, LogValuer, LoggingInterceptor, MetadataFields, Peer,
    StreamError, StreamingConn, StreamingHandler, TracingSink, UnaryRequest, Value,
};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tonic::{Code, Request, Response, Status};
use tracing::Level;

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuf {
    fn lines(&self) -> Vec<serde_json::Value> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

fn json_subscriber(buf: SharedBuf, level: Level) -> impl tracing::Subscriber + Send + Sync {
    tracing_subscriber::fmt()
        .json()
        .with_max_level(level)
        .with_writer(move || buf.clone())
        .finish()
}

fn interceptor() -> LoggingInterceptor {
    LoggingInterceptor::builder()
        .sink(Arc::new(TracingSink::new()))
        .context_fields(MetadataFields::tracing())
        .build()
}

fn request(text: &str) -> UnaryRequest<Ping> {
    let mut request = Request::new(ping(text));
    request
        .metadata_mut()
        .insert("x-request-id", "req-77".parse().unwrap());
    UnaryRequest::new(
        CallSpec::new("/user.v1.UserService/GetUser").unwrap(),
        Peer::new("grpc", "10.2.0.1:6000"),
        request,
    )
}

#[derive(Error, Debug)]
#[error("email rejected")]
struct EmailRejected;

impl LogValuer for EmailRejected {
    fn log_value(&self) -> Value {
        Value::Group(vec![Field::new("field", "email")])
    }
}

struct EchoOnce;

#[async_trait]
impl StreamingHandler<Ping, Pong> for EchoOnce {
    type Error = StreamError;

    async fn call(
        &self,
        stream: &mut dyn StreamingConn<Inbound = Ping, Outbound = Pong>,
    ) -> Result<(), StreamError> {
        let message = stream.receive().await?;
        stream.send(pong(&message.text, 1)).await?;
        stream.receive().await.map(|_| ())
    }
}

#[tokio::test]
async fn test_unary_summary_fields_are_structured() {
    let buf = SharedBuf::default();
    let _guard = tracing::subscriber::set_default(json_subscriber(buf.clone(), Level::INFO));

    let handler = |request: UnaryRequest<Ping>| async move {
        Ok::<_, Status>(Response::new(pong(&request.into_inner().text, 3)))
    };
    let _: Result<Response<Pong>, Status> = interceptor().unary(request("alice"), &handler).await;

    let lines = buf.lines();
    assert_eq!(lines.len(), 1);
    let fields = &lines[0]["fields"];

    assert_eq!(fields["message"], "request completed");
    assert_eq!(lines[0]["level"], "INFO");
    assert_eq!(fields["service"], "user.v1.UserService");
    assert_eq!(fields["method"], "GetUser");
    assert_eq!(fields["protocol"], "grpc");
    assert_eq!(fields["addr"], "10.2.0.1:6000");
    assert!(fields["start_time"].is_string());
    assert!(fields["duration_ms"].is_u64());
    assert!(fields["duration_us"].is_u64());
    assert_eq!(fields["request_size"], 7);
    assert_eq!(fields["response_size"], 9);
    assert!(fields.get("error.code").is_none());
    assert!(fields.get("fields").is_none());

    // 上下文扩展字段放在 extra 中
    let extra: serde_json::Value = serde_json::from_str(fields["extra"].as_str().unwrap()).unwrap();
    assert_eq!(extra["x_request_id"], "req-77");
}

#[tokio::test]
async fn test_unary_failure_fields_are_structured() {
    let buf = SharedBuf::default();
    let _guard = tracing::subscriber::set_default(json_subscriber(buf.clone(), Level::INFO));

    let handler = |_request: UnaryRequest<Ping>| async move {
        Err::<Response<Pong>, _>(DetailedError::new(EmailRejected).into_status(Code::InvalidArgument))
    };
    let _: Result<Response<Pong>, Status> = interceptor().unary(request("bob"), &handler).await;

    let lines = buf.lines();
    assert_eq!(lines.len(), 1);
    let fields = &lines[0]["fields"];

    assert_eq!(lines[0]["level"], "WARN");
    assert_eq!(fields["message"], "request failed");
    assert_eq!(fields["error.code"], "invalid_argument");
    assert_eq!(fields["error.message"], "email rejected");
    assert!(fields.get("response_size").is_none());

    let extra: serde_json::Value = serde_json::from_str(fields["extra"].as_str().unwrap()).unwrap();
    assert_eq!(extra["error"]["field"], "email");
}

#[tokio::test]
async fn test_stream_summary_counts_are_structured() {
    let buf = SharedBuf::default();
    let _guard = tracing::subscriber::set_default(json_subscriber(buf.clone(), Level::DEBUG));

    let mut conn = MockConn::new(vec![Ok(ping("hi"))]);
    let result = interceptor().streaming(&mut conn, &EchoOnce).await;
    assert!(result.unwrap_err().is_end_of_stream());

    let lines = buf.lines();
    let summary = lines
        .iter()
        .find(|line| line["fields"]["message"] == "stream completed")
        .unwrap();
    let fields = &summary["fields"];
    assert_eq!(fields["messages.sent"], 1);
    assert_eq!(fields["messages.received"], 1);
    assert!(fields["duration_ms"].is_u64());
    assert_eq!(fields["method"], "Talk");

    let received = lines
        .iter()
        .find(|line| line["fields"]["message"] == "stream message received")
        .unwrap();
    assert_eq!(received["level"], "DEBUG");
    assert_eq!(received["fields"]["number"], 1);
    assert_eq!(received["fields"]["size"], 4);
}

#[test]
fn test_duration_serializes_as_millis() {
    let value = Value::from(std::time::Duration::from_micros(2500));
    assert_eq!(serde_json::to_value(&value).unwrap(), serde_json::json!(2.5));
}
