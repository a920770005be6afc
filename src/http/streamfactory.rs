//! The transport capability and its HTTP/1.1 implementation.
//!
//! A [`Transport`] opens a connection for one request, writes the head and
//! body, and hands back the response head plus a stream of body chunks.
//! Dropping the returned future or stream aborts the connection.

use crate::base::neterror::NetError;
use crate::http::requestbody::RequestBody;
use crate::http::responsebody::ResponseHead;
use crate::socket::connectjob::ConnectJob;
use crate::urlrequest::target::ConnectionTarget;
use base64::Engine;
use bytes::Bytes;
use futures::future::BoxFuture;
use futures::stream::{BoxStream, Stream, StreamExt, TryStreamExt};
use http::header::{AUTHORIZATION, HOST};
use http::{HeaderMap, HeaderValue, Method, Request};
use http_body::Frame;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, BodyStream, Empty, Full, StreamBody};
use hyper::client::conn::http1;
use hyper_util::rt::TokioIo;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::task::JoinHandle;

/// Body chunks as they arrive from the peer.
pub type ResponseStream = BoxStream<'static, Result<Bytes, NetError>>;

/// Everything the transport needs to send one request.
#[derive(Debug)]
pub struct TransportRequest {
    pub method: Method,
    pub target: ConnectionTarget,
    pub headers: HeaderMap,
    pub body: RequestBody,
}

/// Response head plus the body stream.
pub struct TransportResponse {
    pub head: ResponseHead,
    pub body: ResponseStream,
}

impl TransportResponse {
    pub fn new(head: ResponseHead, body: ResponseStream) -> Self {
        Self { head, body }
    }
}

/// Opens a connection, writes the request and yields the response.
pub trait Transport: Send + Sync {
    fn open(&self, request: TransportRequest) -> BoxFuture<'static, Result<TransportResponse, NetError>>;
}

/// HTTP/1.1 over TCP, or TLS for `https:` targets.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    connector: ConnectJob,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_connector(connector: ConnectJob) -> Self {
        Self { connector }
    }
}

type OutgoingBody = UnsyncBoxBody<Bytes, std::io::Error>;

fn into_outgoing(body: RequestBody) -> OutgoingBody {
    match body {
        RequestBody::Empty => Empty::<Bytes>::new()
            .map_err(|never| match never {})
            .boxed_unsync(),
        RequestBody::Buffered { bytes, .. } => Full::new(bytes)
            .map_err(|never| match never {})
            .boxed_unsync(),
        RequestBody::Streamed(stream) => StreamBody::new(stream.map_ok(Frame::data)).boxed_unsync(),
    }
}

/// Fill in the headers a raw HTTP/1.1 request needs but the caller may
/// have left out.
fn complete_headers(target: &ConnectionTarget, headers: &mut HeaderMap) -> Result<(), NetError> {
    if !headers.contains_key(HOST) {
        let host = target.host_header().unwrap_or_else(|| "localhost".to_string());
        let value = HeaderValue::from_str(&host).map_err(|_| NetError::InvalidHeader {
            name: HOST.to_string(),
        })?;
        headers.insert(HOST, value);
    }

    if let Some(auth) = target.auth.as_deref() {
        if !headers.contains_key(AUTHORIZATION) {
            let encoded = base64::engine::general_purpose::STANDARD.encode(auth);
            let value = HeaderValue::from_str(&format!("Basic {encoded}")).map_err(|_| {
                NetError::InvalidHeader {
                    name: AUTHORIZATION.to_string(),
                }
            })?;
            headers.insert(AUTHORIZATION, value);
        }
    }
    Ok(())
}

impl Transport for HttpTransport {
    fn open(&self, request: TransportRequest) -> BoxFuture<'static, Result<TransportResponse, NetError>> {
        let connector = self.connector.clone();

        Box::pin(async move {
            let TransportRequest {
                method,
                target,
                mut headers,
                body,
            } = request;

            complete_headers(&target, &mut headers)?;

            let host = target.connect_host().unwrap_or("localhost");
            let port = target.port_or_default();
            let socket = connector.connect(host, port, target.is_https()).await?;

            let (mut sender, conn) = http1::handshake::<_, OutgoingBody>(TokioIo::new(socket)).await?;

            // Drive the connection; aborted when the guard drops.
            let guard = ConnectionGuard(tokio::spawn(async move {
                if let Err(e) = conn.await {
                    tracing::debug!(error = %e, "connection driver ended with error");
                }
            }));

            let mut req = Request::builder()
                .method(method)
                .uri(target.request_path())
                .body(into_outgoing(body))
                .map_err(|e| NetError::InvalidUrl(e.to_string()))?;
            *req.headers_mut() = headers;

            sender.ready().await?;
            let resp = sender.send_request(req).await?;
            let (parts, incoming) = resp.into_parts();

            let head = ResponseHead {
                status: parts.status,
                version: parts.version,
                headers: parts.headers,
            };

            let chunks = BodyStream::new(incoming)
                .try_filter_map(|frame| futures::future::ready(Ok(frame.into_data().ok())))
                .map_err(NetError::from);

            let body = GuardedStream {
                inner: chunks.boxed(),
                _guard: guard,
            };

            Ok(TransportResponse::new(head, body.boxed()))
        })
    }
}

/// Aborts the connection driver task when dropped.
struct ConnectionGuard(JoinHandle<()>);

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// A response stream that keeps its connection alive until it is dropped.
struct GuardedStream {
    inner: ResponseStream,
    _guard: ConnectionGuard,
}

impl Stream for GuardedStream {
    type Item = Result<Bytes, NetError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}
