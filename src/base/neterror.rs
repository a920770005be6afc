use std::time::Duration;
use thiserror::Error;

/// Boxed source error carried by transport failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Every failure a request can produce.
///
/// Argument-shape errors (`InvalidInputKind`, `InvalidUrl`,
/// `MalformedHeaderString`, `InvalidSettings`) are returned synchronously
/// from constructors and setters. Everything else is discovered inside an
/// exchange and delivered through the response future or callback.
#[derive(Debug, Error)]
pub enum NetError {
    // Construction Errors
    #[error("Invalid input: expected a URL string or a connection target object, got {0}")]
    InvalidInputKind(&'static str),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Malformed header string (expected \"Key: Value\"): {0:?}")]
    MalformedHeaderString(String),
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    // Exchange Errors
    #[error("Invalid header {name:?}")]
    InvalidHeader { name: String },
    #[error("Invalid body type: {0}")]
    InvalidBodyType(String),
    #[error("Transport error: {0}")]
    TransportError(#[source] BoxError),
    #[error("Request timed out after {}ms", .0.as_millis())]
    TimeoutExceeded(Duration),
    #[error("Failed to parse JSON response: {source}")]
    ResponseParseError {
        raw: String,
        #[source]
        source: serde_json::Error,
    },
}

impl NetError {
    /// Wrap any lower-level failure as a transport error.
    pub fn transport<E: Into<BoxError>>(err: E) -> Self {
        NetError::TransportError(err.into())
    }

    /// The response text that failed to parse, if this is a parse error.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            NetError::ResponseParseError { raw, .. } => Some(raw),
            _ => None,
        }
    }

    /// True for errors raised before any I/O happened.
    pub fn is_argument_error(&self) -> bool {
        matches!(
            self,
            NetError::InvalidInputKind(_)
                | NetError::InvalidUrl(_)
                | NetError::MalformedHeaderString(_)
                | NetError::InvalidSettings(_)
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, NetError::TimeoutExceeded(_))
    }
}

impl From<hyper::Error> for NetError {
    fn from(err: hyper::Error) -> Self {
        NetError::transport(err)
    }
}

impl From<std::io::Error> for NetError {
    fn from(err: std::io::Error) -> Self {
        NetError::transport(err)
    }
}
