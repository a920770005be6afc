//! Base types and error handling.
//!
//! - [`NetError`](neterror::NetError): every failure an exchange can produce
//! - [`LoadState`](loadstate::LoadState): exchange lifecycle states
//! - [`IoResultExt`](context::IoResultExt): context helpers for I/O errors

pub mod context;
pub mod loadstate;
pub mod neterror;
