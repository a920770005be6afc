use crate::base::neterror::NetError;
use crate::http::encoding::Encoding;
use crate::http::headers::HeaderStore;
use crate::http::requestbody::{BodyStream, Payload};
use crate::http::response::Outcome;
use crate::http::streamfactory::{HttpTransport, Transport};
use crate::http::transaction::HttpNetworkTransaction;
use crate::urlrequest::settings::{Settings, SettingsOverrides};
use crate::urlrequest::target::{resolve_target, ConnectionTarget, TargetInput, TargetMode};
use futures::future::BoxFuture;
use http::Method;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

/// The pending result of one exchange.
///
/// Await it directly, or hand a callback to [`ResponseFuture::on_complete`].
#[must_use = "futures do nothing unless awaited or given to on_complete"]
pub struct ResponseFuture {
    inner: BoxFuture<'static, Result<Outcome, NetError>>,
}

impl ResponseFuture {
    fn new<F>(fut: F) -> Self
    where
        F: Future<Output = Result<Outcome, NetError>> + Send + 'static,
    {
        Self {
            inner: Box::pin(fut),
        }
    }

    /// A future that settles immediately with `err`.
    fn failed(err: NetError) -> Self {
        Self::new(async move { Err(err) })
    }

    /// Run the exchange on the tokio runtime and pass its result to
    /// `callback` exactly once.
    ///
    /// Must be called from within a tokio runtime.
    pub fn on_complete<F>(self, callback: F)
    where
        F: FnOnce(Result<Outcome, NetError>) + Send + 'static,
    {
        tokio::spawn(async move {
            callback(self.await);
        });
    }
}

impl Future for ResponseFuture {
    type Output = Result<Outcome, NetError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}

impl std::fmt::Debug for ResponseFuture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ResponseFuture")
    }
}

/// A reusable handle for requests against one target.
///
/// Holds the target, its headers and per-instance settings. Every call
/// works on a snapshot, so later changes to the handle never affect a
/// request already in flight and calls never change the handle.
#[derive(Clone)]
pub struct URLRequest {
    target: ConnectionTarget,
    mode: TargetMode,
    settings: SettingsOverrides,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for URLRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("URLRequest")
            .field("target", &self.target)
            .field("mode", &self.mode)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl URLRequest {
    /// Build a handle from a URL string or a [`ConnectionTarget`].
    ///
    /// ```no_run
    /// # async fn run() -> Result<(), requestninja::NetError> {
    /// use requestninja::URLRequest;
    ///
    /// let request = URLRequest::new("http://httpbin.org/get")?;
    /// let body = request.get(None).await?;
    /// println!("{:?}", body.body());
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(input: impl Into<TargetInput>) -> Result<Self, NetError> {
        Self::with_settings(input, SettingsOverrides::default())
    }

    /// Build a handle with per-instance settings.
    pub fn with_settings(
        input: impl Into<TargetInput>,
        settings: SettingsOverrides,
    ) -> Result<Self, NetError> {
        let (target, mode) = resolve_target(input.into())?;
        Ok(Self {
            target,
            mode,
            settings,
            transport: Arc::new(HttpTransport::new()),
        })
    }

    /// Build a handle from dynamic JSON: a URL string or an options object.
    /// `settings` may be `null` or an object of overrides.
    pub fn from_value(
        input: serde_json::Value,
        settings: serde_json::Value,
    ) -> Result<Self, NetError> {
        let input = TargetInput::try_from(input)?;
        let settings = match settings {
            serde_json::Value::Null => SettingsOverrides::default(),
            other => SettingsOverrides::from_json(other)?,
        };
        Self::with_settings(input, settings)
    }

    pub fn target(&self) -> &ConnectionTarget {
        &self.target
    }

    pub fn mode(&self) -> TargetMode {
        self.mode
    }

    /// Instance settings as given, without library defaults.
    pub fn settings(&self) -> &SettingsOverrides {
        &self.settings
    }

    pub fn headers(&self) -> &HeaderStore {
        &self.target.headers
    }

    pub fn set_encoding(&mut self, encoding: Encoding) -> &mut Self {
        self.settings.encoding = Some(encoding);
        self
    }

    /// Set the instance timeout. Durations past `u64::MAX` milliseconds
    /// saturate.
    pub fn set_timeout(&mut self, timeout: Duration) -> &mut Self {
        let millis = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self.settings.timeout_millis = Some(millis);
        self
    }

    /// Merge headers into the target. Keys are lower-cased.
    pub fn set_headers<I, K, V>(&mut self, headers: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        self.target.headers.set_headers(headers);
        self
    }

    /// Merge one header given as `"Key: Value"`.
    pub fn set_header(&mut self, line: &str) -> Result<&mut Self, NetError> {
        self.target.headers.set_header(line)?;
        Ok(self)
    }

    /// Replace the transport used for future calls.
    pub fn set_transport(&mut self, transport: Arc<dyn Transport>) -> &mut Self {
        self.transport = transport;
        self
    }

    /// Send one request.
    ///
    /// The method follows the target and settings: a URL-built handle
    /// posts when `body` is present unless `forceMethod` says otherwise.
    pub fn go(&self, body: Option<Payload>, overrides: Option<SettingsOverrides>) -> ResponseFuture {
        self.dispatch(body, None, overrides.unwrap_or_default(), HeaderStore::new())
    }

    /// Send one request with `stream` piped as the body.
    pub fn go_with_stream(
        &self,
        stream: BodyStream,
        overrides: Option<SettingsOverrides>,
    ) -> ResponseFuture {
        self.dispatch(
            None,
            Some(stream),
            overrides.unwrap_or_default(),
            HeaderStore::new(),
        )
    }

    pub fn get(&self, overrides: Option<SettingsOverrides>) -> ResponseFuture {
        let overrides = overrides.unwrap_or_default().force_method(Method::GET);
        self.dispatch(None, None, overrides, HeaderStore::new())
    }

    pub fn post(&self, body: Option<Payload>, overrides: Option<SettingsOverrides>) -> ResponseFuture {
        let overrides = overrides.unwrap_or_default().force_method(Method::POST);
        self.dispatch(body, None, overrides, HeaderStore::new())
    }

    pub fn put(&self, body: Option<Payload>, overrides: Option<SettingsOverrides>) -> ResponseFuture {
        let overrides = overrides.unwrap_or_default().force_method(Method::PUT);
        self.dispatch(body, None, overrides, HeaderStore::new())
    }

    /// POST `stream` as the body.
    pub fn post_stream(
        &self,
        stream: BodyStream,
        overrides: Option<SettingsOverrides>,
    ) -> ResponseFuture {
        let overrides = overrides.unwrap_or_default().force_method(Method::POST);
        self.dispatch(None, Some(stream), overrides, HeaderStore::new())
    }

    /// POST `body` serialized as JSON.
    ///
    /// Sets `content-type: application/json` for this call only.
    #[cfg(feature = "json")]
    pub fn post_json<T: serde::Serialize + ?Sized>(
        &self,
        body: &T,
        overrides: Option<SettingsOverrides>,
    ) -> ResponseFuture {
        self.send_json(Method::POST, body, overrides)
    }

    /// PUT `body` serialized as JSON.
    #[cfg(feature = "json")]
    pub fn put_json<T: serde::Serialize + ?Sized>(
        &self,
        body: &T,
        overrides: Option<SettingsOverrides>,
    ) -> ResponseFuture {
        self.send_json(Method::PUT, body, overrides)
    }

    #[cfg(feature = "json")]
    fn send_json<T: serde::Serialize + ?Sized>(
        &self,
        method: Method,
        body: &T,
        overrides: Option<SettingsOverrides>,
    ) -> ResponseFuture {
        let json = match serde_json::to_string(body) {
            Ok(json) => json,
            Err(e) => return ResponseFuture::failed(NetError::InvalidBodyType(e.to_string())),
        };
        let overrides = overrides.unwrap_or_default().force_method(method);
        let headers: HeaderStore = [("content-type", crate::http::contenttype::APPLICATION_JSON)]
            .into_iter()
            .collect();
        self.dispatch(Some(Payload::Text(json)), None, overrides, headers)
    }

    /// Snapshot the handle and start an exchange on the copy.
    fn dispatch(
        &self,
        payload: Option<Payload>,
        stream: Option<BodyStream>,
        overrides: SettingsOverrides,
        call_headers: HeaderStore,
    ) -> ResponseFuture {
        let settings = Settings::resolve(&Settings::default(), &self.settings, &overrides);

        let mut target = self.target.clone();
        target.headers.merge(&call_headers);

        let mut transaction =
            HttpNetworkTransaction::new(self.transport.clone(), target, self.mode, settings);
        if let Some(payload) = payload {
            transaction.set_payload(payload);
        }
        if let Some(stream) = stream {
            transaction.set_stream(stream);
        }

        ResponseFuture::new(transaction.start())
    }
}
