//! RPC 框架接入点
//!
//! 定义拦截器包装的一元 / 流式 handler 接口，以及调用的过程标识和对端信息

pub mod stream;

pub use stream::GrpcStream;

use crate::error::{LoggingError, Result, StreamError};
use crate::payload::Payload;
use async_trait::async_trait;
use std::error::Error as StdError;
use std::future::Future;
use tonic::metadata::MetadataMap;
use tonic::{Extensions, Request, Response};

/// gRPC 协议标识
pub const PROTOCOL_GRPC: &str = "grpc";

/// 调用的过程标识，形如 `/package.Service/Method`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSpec {
    procedure: String,
    service: String,
    method: String,
}

impl CallSpec {
    /// 解析过程标识
    ///
    /// 去掉前导 `/` 后按第一个 `/` 拆分为 service 与 method，
    /// 不包含分隔符的标识会被拒绝。
    pub fn new(procedure: impl Into<String>) -> Result<Self> {
        let procedure = procedure.into();
        let trimmed = procedure.strip_prefix('/').unwrap_or(&procedure);
        let (service, method) = trimmed
            .split_once('/')
            .ok_or_else(|| LoggingError::InvalidProcedure(procedure.clone()))?;

        Ok(Self {
            service: service.to_string(),
            method: method.to_string(),
            procedure,
        })
    }

    pub fn procedure(&self) -> &str {
        &self.procedure
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn method(&self) -> &str {
        &self.method
    }
}

/// 调用对端
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Peer {
    pub protocol: String,
    pub addr: String,
}

impl Peer {
    pub fn new(protocol: impl Into<String>, addr: impl Into<String>) -> Self {
        Self {
            protocol: protocol.into(),
            addr: addr.into(),
        }
    }

    /// 从 tonic 请求中提取对端地址
    pub fn from_request<T>(request: &Request<T>) -> Self {
        let addr = request
            .remote_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_default();
        Self::new(PROTOCOL_GRPC, addr)
    }
}

/// 一元调用请求
#[derive(Debug)]
pub struct UnaryRequest<T> {
    spec: CallSpec,
    peer: Peer,
    inner: Request<T>,
}

impl<T> UnaryRequest<T> {
    pub fn new(spec: CallSpec, peer: Peer, inner: Request<T>) -> Self {
        Self { spec, peer, inner }
    }

    /// 使用 tonic 请求自身的远端地址作为对端
    pub fn from_request(spec: CallSpec, inner: Request<T>) -> Self {
        let peer = Peer::from_request(&inner);
        Self::new(spec, peer, inner)
    }

    pub fn spec(&self) -> &CallSpec {
        &self.spec
    }

    pub fn peer(&self) -> &Peer {
        &self.peer
    }

    pub fn metadata(&self) -> &MetadataMap {
        self.inner.metadata()
    }

    pub fn extensions(&self) -> &Extensions {
        self.inner.extensions()
    }

    pub fn message(&self) -> &T {
        self.inner.get_ref()
    }

    pub fn request(&self) -> &Request<T> {
        &self.inner
    }

    pub fn into_request(self) -> Request<T> {
        self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }
}

/// 一元调用 handler
#[async_trait]
pub trait UnaryHandler<Req, Resp>: Send + Sync
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    type Error: StdError + Send + Sync + 'static;

    async fn call(&self, request: UnaryRequest<Req>) -> std::result::Result<Response<Resp>, Self::Error>;
}

#[async_trait]
impl<Req, Resp, E, F, Fut> UnaryHandler<Req, Resp> for F
where
    Req: Send + 'static,
    Resp: Send + 'static,
    E: StdError + Send + Sync + 'static,
    F: Fn(UnaryRequest<Req>) -> Fut + Send + Sync,
    Fut: Future<Output = std::result::Result<Response<Resp>, E>> + Send + 'static,
{
    type Error = E;

    async fn call(&self, request: UnaryRequest<Req>) -> std::result::Result<Response<Resp>, E> {
        (self)(request).await
    }
}

/// 双向流连接
///
/// `receive` 在对端没有更多数据时返回 [`StreamError::EndOfStream`]。
#[async_trait]
pub trait StreamingConn: Send {
    type Inbound: Payload + 'static;
    type Outbound: Payload + 'static;

    fn spec(&self) -> &CallSpec;

    fn peer(&self) -> &Peer;

    fn request_metadata(&self) -> &MetadataMap;

    fn response_metadata(&mut self) -> &mut MetadataMap;

    fn extensions(&self) -> &Extensions;

    async fn send(&mut self, message: Self::Outbound) -> std::result::Result<(), StreamError>;

    async fn receive(&mut self) -> std::result::Result<Self::Inbound, StreamError>;
}

/// 流式调用 handler
#[async_trait]
pub trait StreamingHandler<In, Out>: Send + Sync
where
    In: Payload + 'static,
    Out: Payload + 'static,
{
    type Error: StdError + Send + Sync + 'static;

    async fn call(
        &self,
        stream: &mut dyn StreamingConn<Inbound = In, Outbound = Out>,
    ) -> std::result::Result<(), Self::Error>;
}
