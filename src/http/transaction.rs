use crate::base::loadstate::LoadState;
use crate::base::neterror::NetError;
use crate::http::requestbody::{self, BodyStream, Payload, RequestBody};
use crate::http::response::Outcome;
use crate::http::responsebody::{self, BodyAccumulator, ResponseHead};
use crate::http::streamfactory::{ResponseStream, Transport, TransportRequest};
use crate::urlrequest::settings::Settings;
use crate::urlrequest::target::{ConnectionTarget, TargetMode};
use futures::StreamExt;
use http::Method;
use std::sync::Arc;
use tokio::sync::watch;

/// Internal state machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ResolveMethod,
    PrepareBody,
    SendRequest,
    ReadBody,
    Decode,
    Done,
}

impl State {
    /// Map internal state to public LoadState.
    fn to_load_state(self) -> LoadState {
        match self {
            State::ResolveMethod => LoadState::Idle,
            State::PrepareBody => LoadState::MethodResolved,
            State::SendRequest => LoadState::BodyPrepared,
            State::ReadBody => LoadState::AwaitingResponse,
            State::Decode => LoadState::Decoding,
            State::Done => LoadState::Resolved,
        }
    }
}

/// Pick the request method.
///
/// A forced method always wins. Otherwise a URL-derived target with a body
/// becomes `POST`, and anything else uses the target's method or `GET`.
pub fn resolve_method(
    mode: TargetMode,
    target_method: Option<&Method>,
    force: Option<&Method>,
    has_body: bool,
) -> Method {
    if let Some(method) = force {
        return method.clone();
    }
    if mode == TargetMode::DerivedFromUrl && has_body {
        return Method::POST;
    }
    target_method.cloned().unwrap_or(Method::GET)
}

/// One request/response exchange.
///
/// Owns a private copy of the target and settings; nothing it does is
/// visible to the `URLRequest` that created it.
pub struct HttpNetworkTransaction {
    transport: Arc<dyn Transport>,
    target: ConnectionTarget,
    mode: TargetMode,
    settings: Settings,
    payload: Option<Payload>,
    stream: Option<BodyStream>,
    state: State,
    load_state: watch::Sender<LoadState>,
    method: Method,
    body: RequestBody,
    head: Option<ResponseHead>,
    response: Option<ResponseStream>,
    accumulator: BodyAccumulator,
}

impl HttpNetworkTransaction {
    pub fn new(
        transport: Arc<dyn Transport>,
        target: ConnectionTarget,
        mode: TargetMode,
        settings: Settings,
    ) -> Self {
        let (load_state, _) = watch::channel(LoadState::Idle);
        Self {
            transport,
            target,
            mode,
            settings,
            payload: None,
            stream: None,
            state: State::ResolveMethod,
            load_state,
            method: Method::GET,
            body: RequestBody::Empty,
            head: None,
            response: None,
            accumulator: BodyAccumulator::new(),
        }
    }

    pub fn set_payload(&mut self, payload: Payload) {
        self.payload = Some(payload);
    }

    /// Pipe `stream` as the request body. Takes precedence over any payload.
    pub fn set_stream(&mut self, stream: BodyStream) {
        self.stream = Some(stream);
    }

    /// Get the current load state (for progress reporting).
    pub fn get_load_state(&self) -> LoadState {
        *self.load_state.borrow()
    }

    /// Observe state changes while the exchange runs.
    pub fn watch_load_state(&self) -> watch::Receiver<LoadState> {
        self.load_state.subscribe()
    }

    /// The timeout that applies: settings first, then the target's.
    pub fn effective_timeout(&self) -> Option<std::time::Duration> {
        self.settings.timeout.or(self.target.timeout)
    }

    /// Run the exchange to completion.
    ///
    /// When a timeout applies and elapses first, the in-flight transport
    /// work is dropped and the exchange fails with `TimeoutExceeded`.
    pub async fn start(mut self) -> Result<Outcome, NetError> {
        if self.settings.logging_enabled {
            tracing::info!(
                host = ?self.target.hostname,
                path = self.target.request_path(),
                "starting request"
            );
        }

        let result = match self.effective_timeout() {
            Some(limit) => {
                let timed = tokio::time::timeout(limit, self.do_loop()).await;
                timed.unwrap_or_else(|_| {
                    // Drop the connection along with any partial body.
                    self.response = None;
                    Err(NetError::TimeoutExceeded(limit))
                })
            }
            None => self.do_loop().await,
        };

        match &result {
            Ok(_) => {
                self.publish(LoadState::Resolved);
                if self.settings.logging_enabled {
                    tracing::info!(method = %self.method, "request resolved");
                }
            }
            Err(e) => {
                self.publish(LoadState::Failed);
                if self.settings.logging_enabled {
                    tracing::info!(method = %self.method, error = %e, "request failed");
                }
            }
        }
        result
    }

    fn advance(&mut self, next: State) {
        self.state = next;
        self.publish(next.to_load_state());
    }

    fn publish(&self, load_state: LoadState) {
        tracing::debug!(state = load_state.as_str(), "exchange state");
        self.load_state.send_replace(load_state);
    }

    async fn do_loop(&mut self) -> Result<Outcome, NetError> {
        loop {
            match self.state {
                State::ResolveMethod => {
                    let has_body = self.stream.is_some()
                        || self.payload.as_ref().is_some_and(Payload::is_present);
                    self.method = resolve_method(
                        self.mode,
                        self.target.method.as_ref(),
                        self.settings.force_method.as_ref(),
                        has_body,
                    );
                    self.advance(State::PrepareBody);
                }
                State::PrepareBody => {
                    self.body = self.prepare_body()?;
                    self.advance(State::SendRequest);
                }
                State::SendRequest => {
                    let headers = self.target.headers.to_header_map()?;
                    let request = TransportRequest {
                        method: self.method.clone(),
                        target: self.target.clone(),
                        headers,
                        body: std::mem::take(&mut self.body),
                    };
                    tracing::debug!(
                        method = %request.method,
                        streamed = request.body.is_streamed(),
                        body_len = ?request.body.len(),
                        "sending request"
                    );
                    self.publish(LoadState::Sent);

                    let response = self.transport.open(request).await?;
                    self.head = Some(response.head);
                    self.response = Some(response.body);
                    self.advance(State::ReadBody);
                }
                State::ReadBody => {
                    if let Some(stream) = self.response.as_mut() {
                        while let Some(chunk) = stream.next().await {
                            self.accumulator.push(&chunk?);
                        }
                    }
                    self.response = None;
                    tracing::debug!(
                        bytes = self.accumulator.len(),
                        chunks = self.accumulator.chunk_count(),
                        "response body read"
                    );
                    self.advance(State::Decode);
                }
                State::Decode => {
                    let head = self.head.take().ok_or_else(|| {
                        NetError::transport(std::io::Error::other("response head missing"))
                    })?;
                    let body = std::mem::take(&mut self.accumulator).into_bytes();
                    let outcome = responsebody::decode(head, body, &self.settings)?;
                    self.state = State::Done;
                    return Ok(outcome);
                }
                State::Done => {
                    return Err(NetError::transport(std::io::Error::other(
                        "exchange already completed",
                    )));
                }
            }
        }
    }

    /// Encode the body and fill in its headers.
    ///
    /// A stream is always piped. A payload is only sent with POST and PUT;
    /// other methods drop it.
    fn prepare_body(&mut self) -> Result<RequestBody, NetError> {
        if let Some(stream) = self.stream.take() {
            if self.payload.as_ref().is_some_and(Payload::is_present) {
                tracing::warn!("both a payload and a stream were given; sending the stream");
            }
            return Ok(RequestBody::Streamed(stream));
        }

        let Some(payload) = self.payload.take().filter(Payload::is_present) else {
            return Ok(RequestBody::Empty);
        };

        if self.method != Method::POST && self.method != Method::PUT {
            tracing::warn!(method = %self.method, "request body dropped for this method");
            return Ok(RequestBody::Empty);
        }

        match requestbody::encode(&payload, &self.target.headers, &self.settings)? {
            None => Ok(RequestBody::Empty),
            Some((bytes, content_type)) => {
                if !self.target.headers.contains("content-type") {
                    self.target.headers.insert("content-type", content_type.clone());
                }
                if !self.target.headers.contains("content-length") {
                    self.target
                        .headers
                        .insert("content-length", bytes.len().to_string());
                }
                Ok(RequestBody::Buffered {
                    bytes,
                    content_type,
                })
            }
        }
    }
}
