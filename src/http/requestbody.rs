//! Request payloads and how they become bytes on the wire.

use crate::base::neterror::NetError;
use crate::http::contenttype::{self, APPLICATION_JSON, FORM_URLENCODED};
use crate::http::headers::HeaderStore;
use crate::urlrequest::settings::Settings;
use bytes::Bytes;
use futures::stream::BoxStream;
use serde_json::Value;
use std::fmt;

/// A caller-supplied body stream, piped to the connection chunk by chunk.
pub type BodyStream = BoxStream<'static, Result<Bytes, std::io::Error>>;

/// What the caller wants to send.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Sent as-is.
    Text(String),
    /// Sent as-is.
    Bytes(Bytes),
    /// Objects and arrays are serialized as JSON or as a form; `null` means
    /// no body; numbers and booleans are rejected.
    Structured(Value),
}

impl Payload {
    /// Convert any serializable value into a structured payload.
    pub fn structured<T: serde::Serialize>(value: &T) -> Result<Self, NetError> {
        serde_json::to_value(value)
            .map(Payload::Structured)
            .map_err(|e| NetError::InvalidBodyType(e.to_string()))
    }

    /// False for payloads that mean "no body": `null` and empty text or
    /// bytes.
    pub fn is_present(&self) -> bool {
        match self {
            Payload::Text(text) => !text.is_empty(),
            Payload::Bytes(bytes) => !bytes.is_empty(),
            Payload::Structured(Value::Null) => false,
            Payload::Structured(Value::String(text)) => !text.is_empty(),
            Payload::Structured(_) => true,
        }
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload::Text(s)
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Payload::Text(s.to_owned())
    }
}

impl From<Vec<u8>> for Payload {
    fn from(v: Vec<u8>) -> Self {
        Payload::Bytes(Bytes::from(v))
    }
}

impl From<&[u8]> for Payload {
    fn from(v: &[u8]) -> Self {
        Payload::Bytes(Bytes::copy_from_slice(v))
    }
}

impl From<Bytes> for Payload {
    fn from(b: Bytes) -> Self {
        Payload::Bytes(b)
    }
}

impl From<Value> for Payload {
    fn from(v: Value) -> Self {
        Payload::Structured(v)
    }
}

/// The body of one outgoing request.
#[derive(Default)]
pub enum RequestBody {
    /// No body (GET, HEAD, DELETE, or nothing supplied).
    #[default]
    Empty,
    /// A fully encoded body with a known length.
    Buffered { bytes: Bytes, content_type: String },
    /// A body of unknown length, sent with chunked transfer encoding.
    Streamed(BodyStream),
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestBody::Empty => f.write_str("Empty"),
            RequestBody::Buffered {
                bytes,
                content_type,
            } => f
                .debug_struct("Buffered")
                .field("len", &bytes.len())
                .field("content_type", content_type)
                .finish(),
            RequestBody::Streamed(_) => f.write_str("Streamed(..)"),
        }
    }
}

impl RequestBody {
    /// Check if the body is empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, RequestBody::Empty)
    }

    /// Known length in bytes; `None` for streams.
    pub fn len(&self) -> Option<usize> {
        match self {
            RequestBody::Empty => Some(0),
            RequestBody::Buffered { bytes, .. } => Some(bytes.len()),
            RequestBody::Streamed(_) => None,
        }
    }

    pub fn is_streamed(&self) -> bool {
        matches!(self, RequestBody::Streamed(_))
    }
}

/// Decide how `payload` is serialized.
///
/// Returns the encoded bytes and the content-type to send, or `None` when
/// the payload means "no body". An existing `content-type` header always
/// wins over the one the encoder would pick.
pub fn encode(
    payload: &Payload,
    headers: &HeaderStore,
    settings: &Settings,
) -> Result<Option<(Bytes, String)>, NetError> {
    let declared = headers.get("content-type");
    let content_type = |fallback: &str| declared.unwrap_or(fallback).to_string();

    match payload {
        Payload::Text(text) => Ok(Some((
            Bytes::from(text.clone()),
            content_type(FORM_URLENCODED),
        ))),
        Payload::Bytes(bytes) => Ok(Some((bytes.clone(), content_type(FORM_URLENCODED)))),
        Payload::Structured(Value::Null) => Ok(None),
        Payload::Structured(Value::String(text)) => Ok(Some((
            Bytes::from(text.clone()),
            content_type(FORM_URLENCODED),
        ))),
        Payload::Structured(value @ (Value::Object(_) | Value::Array(_))) => {
            if contenttype::is_json(declared) && settings.encode_json_request {
                let json =
                    serde_json::to_vec(value).map_err(|e| NetError::InvalidBodyType(e.to_string()))?;
                Ok(Some((Bytes::from(json), content_type(APPLICATION_JSON))))
            } else {
                Ok(Some((
                    Bytes::from(form_encode(value)),
                    content_type(FORM_URLENCODED),
                )))
            }
        }
        Payload::Structured(Value::Bool(_)) => {
            Err(NetError::InvalidBodyType("boolean".to_string()))
        }
        Payload::Structured(Value::Number(_)) => {
            Err(NetError::InvalidBodyType("number".to_string()))
        }
    }
}

/// Serialize an object (or array, keyed by index) as
/// `application/x-www-form-urlencoded`.
///
/// Arrays repeat their key; `null`, nested objects and nested arrays
/// become empty values.
pub fn form_encode(value: &Value) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());

    let mut append = |key: &str, value: &Value| match value {
        Value::Array(items) => {
            for item in items {
                serializer.append_pair(key, &scalar_to_string(item));
            }
        }
        other => {
            serializer.append_pair(key, &scalar_to_string(other));
        }
    };

    match value {
        Value::Object(map) => {
            for (key, value) in map {
                append(key, value);
            }
        }
        Value::Array(items) => {
            for (index, value) in items.iter().enumerate() {
                append(&index.to_string(), value);
            }
        }
        _ => {}
    }

    serializer.finish()
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Object(_) | Value::Array(_) => String::new(),
    }
}
