//! Minimal `Content-Type` parsing.
//!
//! Splits on `;`, trims and lower-cases each segment. Matching is
//! case-insensitive, so `Application/JSON; charset=UTF-8` counts as JSON.

pub const APPLICATION_JSON: &str = "application/json";
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    segments: Vec<String>,
}

impl ContentType {
    pub fn parse(header: &str) -> Self {
        let segments = header
            .split(';')
            .map(|s| s.trim().to_ascii_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        Self { segments }
    }

    /// The leading `type/subtype` segment, if any.
    pub fn essence(&self) -> Option<&str> {
        self.segments.first().map(String::as_str)
    }

    /// True when any segment is exactly `application/json`.
    pub fn is_json(&self) -> bool {
        self.segments.iter().any(|s| s == APPLICATION_JSON)
    }

    /// Look up a `key=value` parameter such as `charset`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.segments.iter().skip(1).find_map(|s| {
            let (k, v) = s.split_once('=')?;
            (k.trim() == key).then(|| v.trim().trim_matches('"'))
        })
    }
}

/// Shorthand for `ContentType::parse(header).is_json()` on an optional header.
pub fn is_json(header: Option<&str>) -> bool {
    header.map(|h| ContentType::parse(h).is_json()).unwrap_or(false)
}
