//! Response normalisation shared by the adapters.
//!
//! A request either yields a domain value or an [`ApiError`]. Failed statuses
//! go through [`HttpError::from_response_body`] and are reported with the
//! operation's [`OperationLabel`].

use bytes::Bytes;
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ApiError, HttpError, OperationLabel};

/// Pass successful responses through; turn any other status into an
/// [`HttpError`] and report it under `label`.
pub async fn ensure_success(response: Response, label: OperationLabel) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    // An unreadable body is treated like a body without localized message.
    let body = response.bytes().await.unwrap_or_default();
    let error = HttpError::from_response_body(status, &body);
    label.report(&error);
    Err(error.into())
}

/// Decode a JSON body.
pub async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

/// Decode a body that may legitimately be empty.
///
/// An empty body, or a JSON `null`, `false`, `0` or `""`, decodes to `None`.
/// The LMS uses this to answer "not enrolled" with a bare `200`.
pub async fn read_optional_json<T: DeserializeOwned>(
    response: Response,
) -> Result<Option<T>, ApiError> {
    let body = response.bytes().await?;
    decode_optional(&body)
}

/// Raw body bytes (file downloads).
pub async fn read_bytes(response: Response) -> Result<Bytes, ApiError> {
    Ok(response.bytes().await?)
}

fn decode_optional<T: DeserializeOwned>(body: &[u8]) -> Result<Option<T>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let value: Value = serde_json::from_slice(body)?;
    if is_falsy(&value) {
        return Ok(None);
    }
    Ok(Some(serde_json::from_value(value)?))
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::Array(_) | Value::Object(_) => false,
    }
}
