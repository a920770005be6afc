//! Request and response handling for a single exchange.
//!
//! - [`headers`]: lower-cased header storage
//! - [`requestbody`]: payloads and the body encoder
//! - [`responsebody`]: the response decoder
//! - [`streamfactory`]: the [`Transport`] capability and its hyper implementation
//! - [`transaction`]: the per-exchange state machine

pub mod contenttype;
pub mod encoding;
pub mod headers;
pub mod requestbody;
pub mod response;
pub mod responsebody;
pub mod streamfactory;
pub mod transaction;

// Re-exports for convenience
pub use encoding::Encoding;
pub use headers::HeaderStore;
pub use requestbody::{BodyStream, Payload, RequestBody};
pub use response::{DecodedBody, Outcome, ResponseEnvelope};
pub use responsebody::ResponseHead;
pub use streamfactory::{HttpTransport, Transport, TransportRequest, TransportResponse};
