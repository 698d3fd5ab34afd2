//! HTTP primitives shared by the LMS and commerce adapters.
//!
//! - [`HttpError`] and [`ApiError`]: the typed failures every adapter returns
//! - [`TracedClient`]: reqwest wrapper injecting W3C trace context
//! - [`response`]: the request lifecycle helpers (status check, body decoding)

pub mod client;
pub mod error;
pub mod response;
pub mod status;
pub mod trace;

pub use client::TracedClient;
pub use error::{ApiError, HttpError, OperationLabel};
pub use status::HttpStatusCode;
