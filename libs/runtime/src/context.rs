use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Flavour of an LMS integration profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LmsBackendKind {
    Dummy,
    OpenedxDogwood,
    OpenedxHawthorn,
    OpenedxFonzie,
}

impl LmsBackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dummy => "dummy",
            Self::OpenedxDogwood => "openedx-dogwood",
            Self::OpenedxHawthorn => "openedx-hawthorn",
            Self::OpenedxFonzie => "openedx-fonzie",
        }
    }
}

/// One configured LMS: flavour, base endpoint and the pattern that both
/// recognises its course links and captures the course id (`course_id`
/// named group).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LmsBackendConfig {
    pub backend: LmsBackendKind,
    pub endpoint: String,
    pub course_regexp: String,
}

impl LmsBackendConfig {
    /// Endpoint without trailing slash, ready for route interpolation.
    pub fn base_url(&self) -> &str {
        self.endpoint.trim_end_matches('/')
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AuthenticationBackend {
    pub backend: String,
    pub endpoint: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct JoanieBackend {
    pub endpoint: String,
}

/// Context object describing the backends available to the front-end.
/// Read-only once loaded. Keys the adapters do not use (CSRF token, Sentry
/// DSN, analytics providers...) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RichieContext {
    #[serde(default)]
    pub lms_backends: Vec<LmsBackendConfig>,
    #[serde(default)]
    pub authentication: Option<AuthenticationBackend>,
    #[serde(default)]
    pub joanie_backend: Option<JoanieBackend>,
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default)]
    pub release: String,
}

impl Default for RichieContext {
    fn default() -> Self {
        Self {
            lms_backends: Vec::new(),
            authentication: None,
            joanie_backend: None,
            environment: default_environment(),
            release: String::new(),
        }
    }
}

fn default_environment() -> String {
    "development".to_string()
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContextError {
    #[error("{field}: invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint {
        field: String,
        endpoint: String,
        reason: String,
    },
    #[error("lms_backends[{index}]: course_regexp must not be empty")]
    EmptyCourseRegexp { index: usize },
}

impl RichieContext {
    /// Check every endpoint parses as an absolute URL. Patterns are compiled
    /// by the backend locator, only emptiness is checked here.
    pub fn validate(&self) -> Result<(), ContextError> {
        for (index, lms) in self.lms_backends.iter().enumerate() {
            check_endpoint(&format!("lms_backends[{index}].endpoint"), &lms.endpoint)?;
            if lms.course_regexp.trim().is_empty() {
                return Err(ContextError::EmptyCourseRegexp { index });
            }
        }
        if let Some(auth) = &self.authentication {
            check_endpoint("authentication.endpoint", &auth.endpoint)?;
        }
        if let Some(joanie) = &self.joanie_backend {
            check_endpoint("joanie_backend.endpoint", &joanie.endpoint)?;
        }
        Ok(())
    }

    pub fn joanie_endpoint(&self) -> Option<&str> {
        self.joanie_backend
            .as_ref()
            .map(|j| j.endpoint.trim_end_matches('/'))
    }

    pub fn authentication_endpoint(&self) -> Option<&str> {
        self.authentication
            .as_ref()
            .map(|a| a.endpoint.trim_end_matches('/'))
    }
}

fn check_endpoint(field: &str, endpoint: &str) -> Result<(), ContextError> {
    Url::parse(endpoint)
        .map(|_| ())
        .map_err(|e| ContextError::InvalidEndpoint {
            field: field.to_string(),
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })
}
