//! Request settings and the three-tier override merge.
//!
//! Library defaults, per-instance settings and per-call overrides are
//! layered with [`Settings::resolve`]. Instance and call tiers are
//! [`SettingsOverrides`] where every field is optional; the result is a
//! fully populated [`Settings`]. None of the inputs is modified.

use crate::base::neterror::NetError;
use crate::http::encoding::Encoding;
use crate::urlrequest::target::deserialize_method;
use http::Method;
use serde::Deserialize;
use std::time::Duration;

/// Fully resolved settings for one exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Encoding used to turn the response bytes into text.
    pub encoding: Encoding,
    /// Abort the exchange after this long.
    pub timeout: Option<Duration>,
    /// Serialize structured bodies as JSON when the request content-type is JSON.
    pub encode_json_request: bool,
    /// Parse JSON responses instead of returning raw text.
    pub parse_json_response: bool,
    /// Resolve with the whole envelope instead of only the decoded body.
    pub return_full_response: bool,
    /// Use this method regardless of what inference would pick.
    pub force_method: Option<Method>,
    /// Emit per-exchange diagnostics as `tracing` info events. Nothing is
    /// printed unless the application installs a subscriber.
    pub logging_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            encoding: Encoding::Utf8,
            timeout: None,
            encode_json_request: true,
            parse_json_response: true,
            return_full_response: false,
            force_method: None,
            logging_enabled: false,
        }
    }
}

impl Settings {
    /// Layer `instance` and then `call` on top of `defaults`.
    pub fn resolve(
        defaults: &Settings,
        instance: &SettingsOverrides,
        call: &SettingsOverrides,
    ) -> Settings {
        defaults.overlay(instance).overlay(call)
    }

    /// Return a copy of `self` with every field set in `overrides` replaced.
    pub fn overlay(&self, overrides: &SettingsOverrides) -> Settings {
        Settings {
            encoding: overrides.encoding.unwrap_or(self.encoding),
            timeout: overrides.timeout().or(self.timeout),
            encode_json_request: overrides
                .encode_json_request
                .unwrap_or(self.encode_json_request),
            parse_json_response: overrides
                .parse_json_response
                .unwrap_or(self.parse_json_response),
            return_full_response: overrides
                .return_full_response
                .unwrap_or(self.return_full_response),
            force_method: overrides
                .force_method
                .clone()
                .or_else(|| self.force_method.clone()),
            logging_enabled: overrides.logging_enabled.unwrap_or(self.logging_enabled),
        }
    }
}

/// A partial set of settings. Unset fields fall through to the tier below.
///
/// Deserializes from a camelCase JSON object; unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsOverrides {
    pub encoding: Option<Encoding>,
    pub timeout_millis: Option<u64>,
    #[serde(alias = "encodeJSONRequest")]
    pub encode_json_request: Option<bool>,
    pub parse_json_response: Option<bool>,
    pub return_full_response: Option<bool>,
    #[serde(deserialize_with = "deserialize_method")]
    pub force_method: Option<Method>,
    pub logging_enabled: Option<bool>,
}

impl SettingsOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse overrides from a JSON value such as `{"timeoutMillis": 500}`.
    pub fn from_json(value: serde_json::Value) -> Result<Self, NetError> {
        serde_json::from_value(value).map_err(|e| NetError::InvalidSettings(e.to_string()))
    }

    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_millis.map(Duration::from_millis)
    }

    pub fn timeout_millis(mut self, millis: u64) -> Self {
        self.timeout_millis = Some(millis);
        self
    }

    pub fn encode_json_request(mut self, enabled: bool) -> Self {
        self.encode_json_request = Some(enabled);
        self
    }

    pub fn parse_json_response(mut self, enabled: bool) -> Self {
        self.parse_json_response = Some(enabled);
        self
    }

    pub fn return_full_response(mut self, enabled: bool) -> Self {
        self.return_full_response = Some(enabled);
        self
    }

    pub fn force_method(mut self, method: Method) -> Self {
        self.force_method = Some(method);
        self
    }

    /// Turn the per-exchange `tracing` info events on or off. The
    /// application must install a subscriber to see them.
    pub fn logging_enabled(mut self, enabled: bool) -> Self {
        self.logging_enabled = Some(enabled);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.encoding, Encoding::Utf8);
        assert!(settings.timeout.is_none());
        assert!(settings.encode_json_request);
        assert!(settings.parse_json_response);
        assert!(!settings.return_full_response);
        assert!(settings.force_method.is_none());
        assert!(!settings.logging_enabled);
    }

    #[test]
    fn test_later_tier_wins() {
        let instance = SettingsOverrides::new()
            .timeout_millis(1_000)
            .encoding(Encoding::Latin1);
        let call = SettingsOverrides::new().timeout_millis(50);

        let effective = Settings::resolve(&Settings::default(), &instance, &call);
        assert_eq!(effective.timeout, Some(Duration::from_millis(50)));
        assert_eq!(effective.encoding, Encoding::Latin1);
    }

    #[test]
    fn test_resolve_does_not_mutate_inputs() {
        let defaults = Settings::default();
        let instance = SettingsOverrides::new().return_full_response(true);
        let call = SettingsOverrides::new().force_method(Method::PUT);

        let effective = Settings::resolve(&defaults, &instance, &call);
        assert!(effective.return_full_response);
        assert_eq!(effective.force_method, Some(Method::PUT));

        assert_eq!(defaults, Settings::default());
        assert!(instance.force_method.is_none());
        assert!(call.return_full_response.is_none());
    }

    #[test]
    fn test_from_json_ignores_unknown_keys() {
        let overrides = SettingsOverrides::from_json(json!({
            "timeoutMillis": 250,
            "forceMethod": "put",
            "parseJsonResponse": false,
            "somethingElse": true,
        }))
        .unwrap();

        assert_eq!(overrides.timeout(), Some(Duration::from_millis(250)));
        assert_eq!(overrides.force_method, Some(Method::PUT));
        assert_eq!(overrides.parse_json_response, Some(false));
    }

    #[test]
    fn test_from_json_accepts_legacy_json_key() {
        let overrides =
            SettingsOverrides::from_json(json!({ "encodeJSONRequest": false })).unwrap();
        assert_eq!(overrides.encode_json_request, Some(false));
    }

    #[test]
    fn test_from_json_rejects_bad_values() {
        let err = SettingsOverrides::from_json(json!({ "encoding": "klingon" })).unwrap_err();
        assert!(matches!(err, NetError::InvalidSettings(_)));

        let err = SettingsOverrides::from_json(json!({ "forceMethod": "NOT A METHOD" })).unwrap_err();
        assert!(matches!(err, NetError::InvalidSettings(_)));
    }
}
