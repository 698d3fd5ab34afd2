use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use richie_http::ApiError;
use runtime::LmsBackendKind;

use crate::contract::api::{EnrollmentApi, LmsApi, UserApi};
use crate::contract::model::{CourseDetails, Enrollment, User};
use crate::locator::CoursePattern;
use crate::navigation::Navigator;

/// Username of the session opened by `login`/`register`.
pub const DUMMY_USERNAME: &str = "admin";

/// In-process LMS for demos and tests: no network, session and enrollments
/// live in memory for the lifetime of the client.
pub struct DummyLmsApi {
    pattern: CoursePattern,
    navigator: Arc<dyn Navigator>,
    session: Mutex<Option<User>>,
    enrollments: Mutex<HashMap<(String, String), Enrollment>>,
}

impl DummyLmsApi {
    pub fn new(pattern: CoursePattern, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            pattern,
            navigator,
            session: Mutex::new(None),
            enrollments: Mutex::new(HashMap::new()),
        }
    }

    pub fn logout(&self) {
        *self.session.lock() = None;
    }

    fn open_session(&self) {
        *self.session.lock() = Some(User::new(DUMMY_USERNAME));
        // Reload the current page with the session open.
        self.navigator.assign(&self.navigator.current_path());
    }
}

impl LmsApi for DummyLmsApi {
    fn backend(&self) -> LmsBackendKind {
        LmsBackendKind::Dummy
    }

    fn user(&self) -> &dyn UserApi {
        self
    }

    fn enrollment(&self) -> &dyn EnrollmentApi {
        self
    }
}

#[async_trait]
impl UserApi for DummyLmsApi {
    fn login(&self) {
        self.open_session();
    }

    fn register(&self) {
        self.open_session();
    }

    async fn me(&self) -> Result<Option<User>, ApiError> {
        Ok(self.session.lock().clone())
    }
}

#[async_trait]
impl EnrollmentApi for DummyLmsApi {
    async fn get(
        &self,
        resource_link: &str,
        user: Option<&User>,
    ) -> Result<Option<Enrollment>, ApiError> {
        let course_id = self.pattern.extract_course_id(resource_link)?;
        let Some(user) = user else {
            return Ok(None);
        };
        Ok(self
            .enrollments
            .lock()
            .get(&(user.username.clone(), course_id))
            .cloned())
    }

    async fn set(&self, resource_link: &str, user: &User) -> Result<bool, ApiError> {
        let course_id = self.pattern.extract_course_id(resource_link)?;
        let enrollment = Enrollment {
            user: user.username.clone(),
            course_run: Some(resource_link.to_string()),
            is_active: true,
            course_details: Some(CourseDetails {
                course_id: course_id.clone(),
            }),
            ..Default::default()
        };
        self.enrollments
            .lock()
            .insert((user.username.clone(), course_id), enrollment);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::RecordingNavigator;

    fn api() -> (DummyLmsApi, Arc<RecordingNavigator>) {
        let nav = Arc::new(RecordingNavigator::new("/courses/demo/"));
        let pattern = CoursePattern::new("course_id=(?<course_id>.*$)").unwrap();
        (DummyLmsApi::new(pattern, nav.clone()), nav)
    }

    #[tokio::test]
    async fn test_login_opens_session_and_reloads() {
        let (api, nav) = api();
        assert_eq!(api.me().await.unwrap(), None);

        api.login();

        assert_eq!(api.me().await.unwrap(), Some(User::new(DUMMY_USERNAME)));
        assert_eq!(nav.last_assigned().as_deref(), Some("/courses/demo/"));

        api.logout();
        assert_eq!(api.me().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_enrollment_lifecycle() {
        let (api, _) = api();
        let link = "https://dummy.test/?course_id=demo-course";
        let user = User::new("jdoe");

        let before = api.get(link, Some(&user)).await.unwrap();
        assert!(before.is_none());
        assert!(!api.is_enrolled(before.as_ref()));

        assert!(api.set(link, &user).await.unwrap());

        let after = api.get(link, Some(&user)).await.unwrap();
        assert!(api.is_enrolled(after.as_ref()));
        let after = after.unwrap();
        assert_eq!(after.course_run.as_deref(), Some(link));
        assert_eq!(after.course_details.unwrap().course_id, "demo-course");

        // Anonymous visitors are never enrolled.
        assert!(api.get(link, None).await.unwrap().is_none());
    }
}
