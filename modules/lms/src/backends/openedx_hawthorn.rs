use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use richie_http::{response, ApiError, HttpStatusCode, OperationLabel, TracedClient};
use runtime::LmsBackendKind;
use tracing::instrument;

use crate::contract::api::{EnrollmentApi, LmsApi, UserApi};
use crate::contract::model::{
    CourseDetailsRef, Enrollment, EnrollmentRequest, EnrollmentStatus, User,
};
use crate::locator::CoursePattern;
use crate::navigation::{redirect_url, Navigator};
use crate::options::Routes;

const GET_USER: OperationLabel = OperationLabel::new("GET", "User");
const GET_ENROLLMENT: OperationLabel = OperationLabel::new("GET", "Enrollment");
const SET_ENROLLMENT: OperationLabel = OperationLabel::new("SET", "Enrollment");

/// OpenEdX (Hawthorn and later) REST adapter.
///
/// Also serves Dogwood and Fonzie profiles, which only differ by their
/// default routes.
pub struct OpenEdxHawthornApi {
    kind: LmsBackendKind,
    client: TracedClient,
    routes: Routes,
    pattern: CoursePattern,
    site_name: String,
    navigator: Arc<dyn Navigator>,
}

impl OpenEdxHawthornApi {
    pub fn new(
        kind: LmsBackendKind,
        client: TracedClient,
        routes: Routes,
        pattern: CoursePattern,
        site_name: String,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            kind,
            client,
            routes,
            pattern,
            site_name,
            navigator,
        }
    }

    pub fn routes(&self) -> &Routes {
        &self.routes
    }

    fn redirect(&self, route: &str) {
        let url = redirect_url(route, &self.site_name, &self.navigator.current_path());
        tracing::info!(backend = self.kind.as_str(), %url, "redirecting to LMS");
        self.navigator.assign(&url);
    }

    fn authorized(&self, builder: RequestBuilder, user: Option<&User>) -> RequestBuilder {
        match user.and_then(|u| u.access_token.as_deref()) {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

impl LmsApi for OpenEdxHawthornApi {
    fn backend(&self) -> LmsBackendKind {
        self.kind
    }

    fn user(&self) -> &dyn UserApi {
        self
    }

    fn enrollment(&self) -> &dyn EnrollmentApi {
        self
    }
}

#[async_trait]
impl UserApi for OpenEdxHawthornApi {
    fn login(&self) {
        self.redirect(&self.routes.user.login);
    }

    fn register(&self) {
        self.redirect(&self.routes.user.register);
    }

    #[instrument(name = "lms.openedx.user.me", skip_all, fields(url = %self.routes.user.me))]
    async fn me(&self) -> Result<Option<User>, ApiError> {
        let builder = self.client.request(Method::GET, &self.routes.user.me);
        let resp = self.client.send(builder).await?;

        if resp.status() == HttpStatusCode::Unauthorized {
            tracing::debug!("no LMS session");
            return Ok(None);
        }

        let resp = response::ensure_success(resp, GET_USER).await?;
        Ok(Some(response::read_json(resp).await?))
    }
}

#[async_trait]
impl EnrollmentApi for OpenEdxHawthornApi {
    #[instrument(
        name = "lms.openedx.enrollment.get",
        skip_all,
        fields(resource_link = %resource_link, anonymous = user.is_none())
    )]
    async fn get(
        &self,
        resource_link: &str,
        user: Option<&User>,
    ) -> Result<Option<Enrollment>, ApiError> {
        let course_id = self.pattern.extract_course_id(resource_link)?;
        let url = self
            .routes
            .enrollment
            .get_url(user.map(|u| u.username.as_str()), &course_id);

        let builder = self.authorized(self.client.request(Method::GET, &url), user);
        let resp = self.client.send(builder).await?;
        let resp = response::ensure_success(resp, GET_ENROLLMENT).await?;

        // A successful empty answer means "not enrolled".
        response::read_optional_json(resp).await
    }

    #[instrument(
        name = "lms.openedx.enrollment.set",
        skip_all,
        fields(resource_link = %resource_link, username = %user.username)
    )]
    async fn set(&self, resource_link: &str, user: &User) -> Result<bool, ApiError> {
        let course_id = self.pattern.extract_course_id(resource_link)?;
        let body = EnrollmentRequest {
            user: &user.username,
            course_details: CourseDetailsRef {
                course_id: &course_id,
            },
        };

        let builder = self
            .client
            .request(Method::POST, &self.routes.enrollment.set)
            .json(&body);
        let builder = self.authorized(builder, Some(user));
        let resp = self.client.send(builder).await?;
        let resp = response::ensure_success(resp, SET_ENROLLMENT).await?;

        let status: Option<EnrollmentStatus> = response::read_optional_json(resp).await?;
        let is_active = status.is_some_and(|s| s.is_active);
        tracing::info!(is_active, "enrollment requested");
        Ok(is_active)
    }
}
