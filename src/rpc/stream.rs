//! tonic 双向流适配
//!
//! 将 tonic 的入站流（`tonic::Streaming<In>` 或任意 `Stream<Item = Result<In, Status>>`）
//! 与出站 `mpsc` 通道组合为 [`StreamingConn`]。

use super::{CallSpec, Peer, StreamingConn};
use crate::error::StreamError;
use crate::payload::Payload;
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use std::marker::PhantomData;
use tokio::sync::mpsc;
use tonic::metadata::MetadataMap;
use tonic::{Extensions, Request, Status};

/// tonic 双向流连接
pub struct GrpcStream<In, Out, S> {
    spec: CallSpec,
    peer: Peer,
    request_metadata: MetadataMap,
    response_metadata: MetadataMap,
    extensions: Extensions,
    inbound: S,
    outbound: mpsc::Sender<Result<Out, Status>>,
    _inbound: PhantomData<fn() -> In>,
}

impl<In, Out, S> GrpcStream<In, Out, S>
where
    S: Stream<Item = Result<In, Status>> + Unpin + Send,
{
    /// 由 tonic 流式请求构造，对端取自请求的远端地址
    pub fn new(
        spec: CallSpec,
        request: Request<S>,
        outbound: mpsc::Sender<Result<Out, Status>>,
    ) -> Self {
        let peer = Peer::from_request(&request);
        Self::with_peer(spec, peer, request, outbound)
    }

    pub fn with_peer(
        spec: CallSpec,
        peer: Peer,
        request: Request<S>,
        outbound: mpsc::Sender<Result<Out, Status>>,
    ) -> Self {
        let (request_metadata, extensions, inbound) = request.into_parts();
        Self {
            spec,
            peer,
            request_metadata,
            response_metadata: MetadataMap::new(),
            extensions,
            inbound,
            outbound,
            _inbound: PhantomData,
        }
    }

    /// 取出待写入响应的 metadata
    pub fn take_response_metadata(&mut self) -> MetadataMap {
        std::mem::take(&mut self.response_metadata)
    }
}

#[async_trait]
impl<In, Out, S> StreamingConn for GrpcStream<In, Out, S>
where
    In: Payload + 'static,
    Out: Payload + 'static,
    S: Stream<Item = Result<In, Status>> + Unpin + Send,
{
    type Inbound = In;
    type Outbound = Out;

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

    async fn send(&mut self, message: Out) -> Result<(), StreamError> {
        self.outbound
            .send(Ok(message))
            .await
            .map_err(|_| StreamError::Status(Status::cancelled("stream receiver dropped")))
    }

    async fn receive(&mut self) -> Result<In, StreamError> {
        match self.inbound.next().await {
            Some(Ok(message)) => Ok(message),
            Some(Err(status)) => Err(StreamError::Status(status)),
            None => Err(StreamError::EndOfStream),
        }
    }
}
