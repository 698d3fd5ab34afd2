//! Adapter factory: from a backend configuration to an [`LmsApi`] client.

use std::sync::Arc;

use richie_http::{ApiError, TracedClient};
use runtime::{LmsBackendConfig, LmsBackendKind, RichieContext};

use crate::backends::openedx_fonzie::fonzie_routes;
use crate::backends::{DummyLmsApi, OpenEdxHawthornApi};
use crate::contract::api::LmsApi;
use crate::locator::{find_lms_backend, CoursePattern};
use crate::navigation::{resolve_site_name, Navigator, CONTAINER_NAME_ENV};
use crate::options::{ApiOptions, Routes};

/// Collaborators shared by every client built by the factory.
#[derive(Clone)]
pub struct LmsDeps {
    pub client: TracedClient,
    pub navigator: Arc<dyn Navigator>,
    /// Deployment container name, second choice for the redirect prefix.
    pub container_name: Option<String>,
    /// Authentication backend endpoint, required by Fonzie.
    pub authentication_endpoint: Option<String>,
}

impl LmsDeps {
    pub fn new(client: TracedClient, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            client,
            navigator,
            container_name: None,
            authentication_endpoint: None,
        }
    }

    /// Read the container name from `RICHIE_CONTAINER_NAME`.
    pub fn from_env(client: TracedClient, navigator: Arc<dyn Navigator>) -> Self {
        Self::new(client, navigator).with_container_name(std::env::var(CONTAINER_NAME_ENV).ok())
    }

    pub fn with_container_name(mut self, container_name: Option<String>) -> Self {
        self.container_name = container_name;
        self
    }

    pub fn with_authentication_endpoint(mut self, endpoint: Option<String>) -> Self {
        self.authentication_endpoint = endpoint.map(|e| e.trim_end_matches('/').to_string());
        self
    }
}

/// Build the client for one backend. Route overrides in `options` replace
/// the backend defaults field by field.
pub fn build(
    config: &LmsBackendConfig,
    options: Option<ApiOptions>,
    deps: LmsDeps,
) -> Result<Arc<dyn LmsApi>, ApiError> {
    let options = options.unwrap_or_default();
    let pattern = CoursePattern::new(&config.course_regexp)?;
    let endpoint = config.base_url();

    let default_routes = match config.backend {
        LmsBackendKind::Dummy => {
            tracing::debug!(endpoint, "building dummy LMS client");
            return Ok(Arc::new(DummyLmsApi::new(pattern, deps.navigator)));
        }
        LmsBackendKind::OpenedxDogwood | LmsBackendKind::OpenedxHawthorn => {
            Routes::openedx(endpoint)
        }
        LmsBackendKind::OpenedxFonzie => {
            let auth = deps.authentication_endpoint.as_deref().ok_or_else(|| {
                ApiError::configuration("openedx-fonzie requires an authentication endpoint")
            })?;
            fonzie_routes(endpoint, auth)
        }
    };

    let routes = default_routes.merged(&options.routes);
    let site_name = resolve_site_name(
        options.site_name.as_deref(),
        deps.container_name.as_deref(),
    );
    tracing::debug!(
        backend = config.backend.as_str(),
        endpoint,
        site_name = %site_name,
        "building OpenEdX client"
    );

    Ok(Arc::new(OpenEdxHawthornApi::new(
        config.backend,
        deps.client,
        routes,
        pattern,
        site_name,
        deps.navigator,
    )))
}

/// Locate the backend hosting `resource_link` and build its client.
/// `Ok(None)` when no configured backend matches.
pub fn build_for_resource_link(
    context: &RichieContext,
    resource_link: &str,
    options: Option<ApiOptions>,
    deps: LmsDeps,
) -> Result<Option<Arc<dyn LmsApi>>, ApiError> {
    let Some(config) = find_lms_backend(resource_link, &context.lms_backends) else {
        tracing::debug!(resource_link, "no LMS backend matches");
        return Ok(None);
    };
    let deps = match deps.authentication_endpoint {
        Some(_) => deps,
        None => {
            let endpoint = context.authentication_endpoint().map(str::to_string);
            deps.with_authentication_endpoint(endpoint)
        }
    };
    build(config, options, deps).map(Some)
}
