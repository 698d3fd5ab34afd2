use async_trait::async_trait;
use richie_http::ApiError;
use runtime::LmsBackendKind;

use crate::contract::model::{Enrollment, User};

/// Session operations of an LMS.
#[async_trait]
pub trait UserApi: Send + Sync {
    /// Navigate to the LMS login page, coming back to the current path.
    fn login(&self);

    /// Navigate to the LMS registration page, coming back to the current path.
    fn register(&self);

    /// Current user. `Ok(None)` means "no session", not a failure.
    async fn me(&self) -> Result<Option<User>, ApiError>;
}

/// Enrollment operations of an LMS.
#[async_trait]
pub trait EnrollmentApi: Send + Sync {
    /// Enrollment of `user` (or of the anonymous visitor) to the course the
    /// link points to. `Ok(None)` means "not enrolled".
    async fn get(
        &self,
        resource_link: &str,
        user: Option<&User>,
    ) -> Result<Option<Enrollment>, ApiError>;

    /// Enroll `user`; true when the LMS reports the enrollment active.
    async fn set(&self, resource_link: &str, user: &User) -> Result<bool, ApiError>;

    fn is_enrolled(&self, enrollment: Option<&Enrollment>) -> bool {
        enrollment.is_some_and(|e| e.is_active)
    }
}

/// A client bound to one configured LMS backend.
pub trait LmsApi: Send + Sync {
    fn backend(&self) -> LmsBackendKind;
    fn user(&self) -> &dyn UserApi;
    fn enrollment(&self) -> &dyn EnrollmentApi;
}
