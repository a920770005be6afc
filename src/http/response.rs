//! What an exchange resolves with.

use http::{HeaderMap, StatusCode, Version};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A response body after decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedBody {
    /// The response was JSON and was parsed.
    Json(Value),
    /// Raw decoded text.
    Text(String),
}

impl DecodedBody {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            DecodedBody::Json(v) => Some(v),
            DecodedBody::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            DecodedBody::Text(s) => Some(s),
            DecodedBody::Json(_) => None,
        }
    }

    /// Deserialize a parsed JSON body into `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Option<T> {
        self.as_json()
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// The body as text; JSON bodies are re-serialized.
    pub fn into_text(self) -> String {
        match self {
            DecodedBody::Text(s) => s,
            DecodedBody::Json(v) => v.to_string(),
        }
    }
}

/// The full response: status metadata, headers and decoded body.
#[derive(Debug, Clone)]
pub struct ResponseEnvelope {
    status: StatusCode,
    version: Version,
    headers: HeaderMap,
    body: DecodedBody,
    raw: bool,
}

impl ResponseEnvelope {
    pub fn new(
        status: StatusCode,
        version: Version,
        headers: HeaderMap,
        body: DecodedBody,
        raw: bool,
    ) -> Self {
        Self {
            status,
            version,
            headers,
            body,
            raw,
        }
    }

    /// Get the status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Get the HTTP version.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Get a reference to the headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &DecodedBody {
        &self.body
    }

    pub fn into_body(self) -> DecodedBody {
        self.body
    }

    /// True when JSON parsing was not applied to the body.
    pub fn is_raw(&self) -> bool {
        self.raw
    }
}

/// The value an exchange settles with: the decoded body alone, or the whole
/// envelope when `returnFullResponse` is set.
#[derive(Debug, Clone)]
pub enum Outcome {
    Body(DecodedBody),
    Full(ResponseEnvelope),
}

impl Outcome {
    /// The decoded body regardless of which shape was requested.
    pub fn body(&self) -> &DecodedBody {
        match self {
            Outcome::Body(body) => body,
            Outcome::Full(envelope) => envelope.body(),
        }
    }

    pub fn into_body(self) -> DecodedBody {
        match self {
            Outcome::Body(body) => body,
            Outcome::Full(envelope) => envelope.into_body(),
        }
    }

    pub fn envelope(&self) -> Option<&ResponseEnvelope> {
        match self {
            Outcome::Full(envelope) => Some(envelope),
            Outcome::Body(_) => None,
        }
    }

    pub fn into_envelope(self) -> Option<ResponseEnvelope> {
        match self {
            Outcome::Full(envelope) => Some(envelope),
            Outcome::Body(_) => None,
        }
    }
}
