use serde::{Deserialize, Serialize};

/// Authenticated LMS user, as returned by the "who am I" route.
///
/// Fonzie backends also return a JWT in `access_token`; when present it is
/// sent as bearer token on enrollment requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            full_name: None,
            email: None,
            access_token: None,
        }
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseDetails {
    pub course_id: String,
}

/// A learner's relationship to one course run.
///
/// OpenEdX reports `created` and `course_details`; Richie-side payloads use
/// `created_at` and `course_run`. Both shapes are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Enrollment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    pub user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_run: Option<String>,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_details: Option<CourseDetails>,
}

/// Body of the enrollment creation request.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct EnrollmentRequest<'a> {
    pub user: &'a str,
    pub course_details: CourseDetailsRef<'a>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct CourseDetailsRef<'a> {
    pub course_id: &'a str,
}

/// Part of the enrollment creation response the adapter relies on.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct EnrollmentStatus {
    pub is_active: bool,
}
