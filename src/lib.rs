//! Flare RPC Logging
//!
//! Logging middleware for gRPC calls: times unary and streaming calls, counts stream
//! messages, classifies failures into gRPC status codes and redacts sensitive metadata
//! before anything is logged. The wrapped handler's result is always returned unchanged.

pub mod config;
pub mod error;
pub mod interceptor;
pub mod log;
pub mod payload;
pub mod rpc;
pub mod telemetry;
pub mod utils;

// Re-exports
pub use config::{LogFormat, LoggingConfig, TelemetryConfig};
pub use error::{
    CANCELED, CodeExt, ContextError, DEADLINE_EXCEEDED, DetailedError, LoggableError,
    LoggingError, Result, StreamError, classify, is_end_of_stream,
};
pub use interceptor::{
    CallContext, CallInfo, ContextFields, Logged, LoggedStream, LoggingInterceptor,
    LoggingInterceptorBuilder, MetadataFields, Redactor, StreamStats, redact_headers,
};
pub use log::{Field, LogRecord, LogSink, LogValuer, NoopSink, RequestLogger, TracingSink, Value};
pub use payload::Payload;
pub use rpc::{
    CallSpec, GrpcStream, Peer, StreamingConn, StreamingHandler, UnaryHandler, UnaryRequest,
};
pub use telemetry::init_tracing;
