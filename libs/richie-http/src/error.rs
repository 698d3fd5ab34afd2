use std::fmt;

use http::StatusCode;
use thiserror::Error;

use crate::status::reason_phrase;

/// Failure of a request whose response status was not a success.
///
/// `message` is the reason phrase of the status (`"Bad Request"`), the
/// optional `localized_message` is taken from a `localizedMessage` field of a
/// JSON error body and is meant to be displayed to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HttpError {
    pub code: u16,
    pub message: String,
    pub localized_message: Option<String>,
}

impl HttpError {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            localized_message: None,
        }
    }

    pub fn with_localized_message(mut self, localized_message: impl Into<String>) -> Self {
        self.localized_message = Some(localized_message.into());
        self
    }

    /// Generic error carrying only the status and its reason phrase.
    pub fn from_status(status: StatusCode) -> Self {
        Self::new(status.as_u16(), reason_phrase(status))
    }

    /// Build an error from a failed response.
    ///
    /// The body is parsed as JSON and a string `localizedMessage` field is kept
    /// as the localized message. Any other body, JSON or not, yields the
    /// generic status error: a `message` field in the body is ignored.
    pub fn from_response_body(status: StatusCode, body: &[u8]) -> Self {
        let error = Self::from_status(status);
        match serde_json::from_slice::<serde_json::Value>(body) {
            Ok(payload) => match payload.get("localizedMessage").and_then(|v| v.as_str()) {
                Some(localized) => error.with_localized_message(localized),
                None => error,
            },
            Err(_) => error,
        }
    }

    /// Message to show to a user: the localized one when the server sent it.
    pub fn user_message(&self) -> &str {
        self.localized_message.as_deref().unwrap_or(&self.message)
    }
}

/// `[VERB - Resource]` tag used when reporting a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationLabel {
    pub verb: &'static str,
    pub resource: &'static str,
}

impl OperationLabel {
    pub const fn new(verb: &'static str, resource: &'static str) -> Self {
        Self { verb, resource }
    }

    /// Line sent to the error sink: `[GET - Enrollment] > 500 - Internal Server Error`.
    pub fn report_line(&self, error: &HttpError) -> String {
        format!("{} > {} - {}", self, error.code, error.message)
    }

    /// Report a failure through the tracing error sink.
    pub fn report(&self, error: &HttpError) {
        tracing::error!(
            operation = %self,
            status = error.code,
            localized = error.localized_message.as_deref(),
            "{}",
            self.report_line(error)
        );
    }
}

impl fmt::Display for OperationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} - {}]", self.verb, self.resource)
    }
}

/// Everything an adapter call can fail with.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unexpected response payload: {0}")]
    UnexpectedPayload(String),

    #[error("invalid resource link: {0}")]
    ResourceLink(String),

    #[error("invalid configuration: {0}")]
    Configuration(String),
}

impl ApiError {
    pub fn resource_link(message: impl Into<String>) -> Self {
        Self::ResourceLink(message.into())
    }

    /// The body decoded but its content is not usable.
    pub fn unexpected_payload(message: impl Into<String>) -> Self {
        Self::UnexpectedPayload(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn as_http(&self) -> Option<&HttpError> {
        match self {
            Self::Http(e) => Some(e),
            _ => None,
        }
    }

    /// Status code of the failed response, if the failure came from one.
    pub fn status(&self) -> Option<u16> {
        self.as_http().map(|e| e.code)
    }
}
