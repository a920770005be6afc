//! Request header storage.
//!
//! Keys are lower-cased on the way in, so `X-Foo` and `x-foo` name the same
//! header and the last value set wins. Insertion order is preserved for the
//! wire.

use crate::base::neterror::NetError;
use http::header::{HeaderName, HeaderValue};
use http::HeaderMap;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::str::FromStr;

/// A header map with lowercase, unique keys that preserves insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "BTreeMap<String, String>")]
pub struct HeaderStore {
    headers: Vec<(String, String)>,
}

impl HeaderStore {
    pub fn new() -> Self {
        Self {
            headers: Vec::new(),
        }
    }

    /// Insert or replace a single header.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        let name = name.to_ascii_lowercase();
        let value = value.into();

        if let Some((_, v)) = self.headers.iter_mut().find(|(n, _)| *n == name) {
            *v = value;
        } else {
            self.headers.push((name, value));
        }
    }

    /// Merge many headers at once. Existing keys are overwritten.
    pub fn set_headers<I, K, V>(&mut self, headers: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (key, value) in headers {
            self.insert(key.as_ref(), value);
        }
        self
    }

    /// Merge a single header given as `"Key: Value"`.
    pub fn set_header(&mut self, line: &str) -> Result<&mut Self, NetError> {
        let (key, value) = parse_header_line(line)?;
        Ok(self.set_headers([(key, value)]))
    }

    /// Overlay another store on top of this one.
    pub fn merge(&mut self, other: &HeaderStore) {
        for (key, value) in &other.headers {
            self.insert(key, value.clone());
        }
    }

    pub fn remove(&mut self, name: &str) {
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Build a standard `http::HeaderMap`, validating every name and value.
    pub fn to_header_map(&self) -> Result<HeaderMap, NetError> {
        let mut map = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            let invalid = || NetError::InvalidHeader { name: name.clone() };
            let header_name = HeaderName::from_str(name).map_err(|_| invalid())?;
            let header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;
            map.insert(header_name, header_value);
        }
        Ok(map)
    }
}

impl From<BTreeMap<String, String>> for HeaderStore {
    fn from(map: BTreeMap<String, String>) -> Self {
        let mut store = HeaderStore::new();
        store.set_headers(map);
        store
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for HeaderStore {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut store = HeaderStore::new();
        store.set_headers(iter);
        store
    }
}

/// Split `"Key: Value"` on the first colon, trimming both halves.
pub fn parse_header_line(line: &str) -> Result<(&str, &str), NetError> {
    let (key, value) = line
        .split_once(':')
        .ok_or_else(|| NetError::MalformedHeaderString(line.to_string()))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(NetError::MalformedHeaderString(line.to_string()));
    }
    Ok((key, value.trim()))
}
