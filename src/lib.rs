//! # requestninja
//!
//! A small HTTP client for one request at a time.
//!
//! A [`URLRequest`] wraps a target (a URL string or an explicit
//! [`ConnectionTarget`]), its headers and per-instance settings. Each call
//! snapshots that state, so requests never affect each other or the handle.
//!
//! ## Features
//!
//! - **Method inference**: URL-built handles `POST` when a body is given
//! - **Body encoding**: JSON or form encoding chosen from the `content-type`
//! - **Response decoding**: JSON responses parsed, everything else as text
//! - **Timeouts**: per-instance or per-call, enforced on the whole exchange
//! - **Futures or callbacks**: await a [`ResponseFuture`] or use
//!   [`ResponseFuture::on_complete`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use requestninja::{SettingsOverrides, URLRequest};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), requestninja::NetError> {
//!     let request = URLRequest::new("http://httpbin.org/post")?;
//!     let outcome = request
//!         .post_json(&json!({ "hello": "world" }), Some(SettingsOverrides::new().timeout_millis(5_000)))
//!         .await?;
//!     println!("{:?}", outcome.body());
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error type and exchange states
//! - [`http`] - Headers, body codecs, transport and the exchange state machine
//! - [`socket`] - TCP and TLS connection setup
//! - [`urlrequest`] - Targets, settings and the request handle

pub mod base;
pub mod http;
pub mod socket;
pub mod urlrequest;

pub use base::loadstate::LoadState;
pub use base::neterror::NetError;
pub use crate::http::{DecodedBody, Encoding, Outcome, Payload, ResponseEnvelope};
pub use urlrequest::{
    ConnectionTarget, ResponseFuture, SettingsOverrides, TargetInput, TargetMode, URLRequest,
};
