//! Response decoding: accumulated bytes in, body or envelope out.

use crate::base::neterror::NetError;
use crate::http::contenttype::ContentType;
use crate::http::response::{DecodedBody, Outcome, ResponseEnvelope};
use crate::urlrequest::settings::Settings;
use bytes::{Bytes, BytesMut};
use http::{HeaderMap, StatusCode, Version};
use serde_json::Value;

/// Collects response chunks until the transport signals end of stream.
#[derive(Debug, Default)]
pub struct BodyAccumulator {
    buf: BytesMut,
    chunks: usize,
}

impl BodyAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
        self.chunks += 1;
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks
    }

    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }
}

/// Status line and headers as delivered by the transport.
#[derive(Debug, Clone)]
pub struct ResponseHead {
    pub status: StatusCode,
    pub version: Version,
    pub headers: HeaderMap,
}

/// Decode the body text according to the response content-type and the
/// effective settings.
///
/// JSON is parsed only when the content-type says so and
/// `parse_json_response` is on; empty JSON text becomes `{}`. A parse
/// failure keeps the raw text in the error.
pub fn decode_text(
    text: String,
    headers: &HeaderMap,
    settings: &Settings,
) -> Result<(DecodedBody, bool), NetError> {
    let content_type = headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(ContentType::parse);
    if let Some(ct) = &content_type {
        tracing::debug!(
            content_type = ?ct.essence(),
            charset = ?ct.param("charset"),
            "decoding response body"
        );
    }

    let is_json = content_type.as_ref().is_some_and(ContentType::is_json);
    if !(settings.parse_json_response && is_json) {
        return Ok((DecodedBody::Text(text), true));
    }

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok((DecodedBody::Json(Value::Object(Default::default())), false));
    }

    match serde_json::from_str(trimmed) {
        Ok(value) => Ok((DecodedBody::Json(value), false)),
        Err(source) => Err(NetError::ResponseParseError { raw: text, source }),
    }
}

/// Turn a complete response into the value the exchange resolves with.
pub fn decode(head: ResponseHead, body: Bytes, settings: &Settings) -> Result<Outcome, NetError> {
    let text = settings.encoding.decode(&body);
    let (decoded, raw) = decode_text(text, &head.headers, settings)?;

    if settings.return_full_response {
        Ok(Outcome::Full(ResponseEnvelope::new(
            head.status,
            head.version,
            head.headers,
            decoded,
            raw,
        )))
    } else {
        Ok(Outcome::Body(decoded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::encoding::Encoding;
    use http::HeaderValue;
    use serde_json::json;

    fn head(content_type: Option<&'static str>) -> ResponseHead {
        let mut headers = HeaderMap::new();
        if let Some(ct) = content_type {
            headers.insert(http::header::CONTENT_TYPE, HeaderValue::from_static(ct));
        }
        ResponseHead {
            status: StatusCode::OK,
            version: Version::HTTP_11,
            headers,
        }
    }

    #[test]
    fn test_json_is_parsed() {
        let out = decode(
            head(Some("application/json; charset=utf-8")),
            Bytes::from_static(br#" {"a": [1, 2]} "#),
            &Settings::default(),
        )
        .unwrap();
        assert_eq!(out.body().as_json(), Some(&json!({"a": [1, 2]})));
    }

    #[test]
    fn test_empty_json_is_empty_object() {
        let out = decode(head(Some("application/json")), Bytes::new(), &Settings::default()).unwrap();
        assert_eq!(out.into_body(), DecodedBody::Json(json!({})));

        let out = decode(
            head(Some("application/json")),
            Bytes::from_static(b"  \n"),
            &Settings::default(),
        )
        .unwrap();
        assert_eq!(out.into_body(), DecodedBody::Json(json!({})));
    }

    #[test]
    fn test_malformed_json_keeps_raw_text() {
        let err = decode(
            head(Some("application/json")),
            Bytes::from_static(b"{not json"),
            &Settings::default(),
        )
        .unwrap_err();
        assert_eq!(err.raw_response(), Some("{not json"));
    }

    #[test]
    fn test_parse_disabled_returns_text() {
        let settings = Settings {
            parse_json_response: false,
            ..Settings::default()
        };
        let out = decode(
            head(Some("application/json")),
            Bytes::from_static(b"{not json"),
            &settings,
        )
        .unwrap();
        assert_eq!(out.body().as_text(), Some("{not json"));
    }

    #[test]
    fn test_non_json_is_untouched() {
        let out = decode(
            head(Some("text/plain")),
            Bytes::from_static(b"  {\"a\":1}  "),
            &Settings::default(),
        )
        .unwrap();
        assert_eq!(out.body().as_text(), Some("  {\"a\":1}  "));

        let out = decode(head(None), Bytes::from_static(b"hi"), &Settings::default()).unwrap();
        assert_eq!(out.body().as_text(), Some("hi"));
    }

    #[test]
    fn test_full_response_envelope() {
        let settings = Settings {
            return_full_response: true,
            ..Settings::default()
        };
        let out = decode(head(Some("text/html")), Bytes::from_static(b"<p>"), &settings).unwrap();
        let envelope = out.into_envelope().unwrap();
        assert_eq!(envelope.status(), StatusCode::OK);
        assert!(envelope.is_raw());
        assert_eq!(envelope.headers()["content-type"], "text/html");
        assert_eq!(envelope.body().as_text(), Some("<p>"));
    }

    #[test]
    fn test_full_response_json_is_not_raw() {
        let settings = Settings {
            return_full_response: true,
            ..Settings::default()
        };
        let out = decode(head(Some("application/json")), Bytes::from_static(b"[]"), &settings)
            .unwrap();
        assert!(!out.envelope().unwrap().is_raw());
    }

    #[test]
    fn test_encoding_applies_before_sniffing() {
        let settings = Settings {
            encoding: Encoding::Hex,
            ..Settings::default()
        };
        let out = decode(head(Some("text/plain")), Bytes::from_static(b"\x01\xff"), &settings)
            .unwrap();
        assert_eq!(out.body().as_text(), Some("01ff"));
    }

    #[test]
    fn test_accumulator() {
        let mut acc = BodyAccumulator::new();
        assert!(acc.is_empty());
        acc.push(b"hel");
        acc.push(b"lo");
        assert_eq!(acc.len(), 5);
        assert_eq!(acc.chunk_count(), 2);
        assert_eq!(acc.into_bytes(), Bytes::from_static(b"hello"));
    }
}
