//! W3C Trace Context propagation for outgoing adapter requests.
//!
//! The LMS and commerce backends log the `traceparent` header, which lets a
//! failed enrollment be correlated with the backend's own logs.

use http::{HeaderMap, HeaderName, HeaderValue};

/// W3C Trace Context header name
pub const TRACEPARENT: &str = "traceparent";

/// Generate a fresh `traceparent` value (version 00, sampled).
pub fn new_traceparent() -> String {
    let trace_id = rand::random::<u128>();
    let span_id = rand::random::<u64>();
    format!("00-{trace_id:032x}-{span_id:016x}-01")
}

/// Insert a `traceparent` header unless the caller already set one.
pub fn inject_trace_context(headers: &mut HeaderMap) {
    if headers.contains_key(TRACEPARENT) {
        return;
    }
    if let Ok(value) = HeaderValue::from_str(&new_traceparent()) {
        headers.insert(HeaderName::from_static(TRACEPARENT), value);
    }
}

/// Trace id part of a `traceparent` value.
pub fn trace_id(traceparent: &str) -> Option<&str> {
    let mut parts = traceparent.split('-');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some("00"), Some(trace_id), Some(_), Some(_)) if trace_id.len() == 32 => Some(trace_id),
        _ => None,
    }
}
