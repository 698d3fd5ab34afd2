//! Route defaults and per-client overrides.

use serde::{Deserialize, Serialize};

const USERNAME: &str = ":username";
const COURSE_ID: &str = ":course_id";

/// Caller-supplied adjustments applied at adapter construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiOptions {
    pub routes: RouteOverrides,
    /// Prefix of the `next` parameter of login/register redirects.
    pub site_name: Option<String>,
}

impl ApiOptions {
    pub fn with_site_name(mut self, site_name: impl Into<String>) -> Self {
        self.site_name = Some(site_name.into());
        self
    }

    pub fn with_routes(mut self, routes: RouteOverrides) -> Self {
        self.routes = routes;
        self
    }
}

/// One optional absolute URL per logical route; `None` keeps the default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RouteOverrides {
    pub user: UserRouteOverrides,
    pub enrollment: EnrollmentRouteOverrides,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct UserRouteOverrides {
    pub me: Option<String>,
    pub login: Option<String>,
    pub register: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EnrollmentRouteOverrides {
    /// Template; `:username` and `:course_id` are interpolated.
    pub get: Option<String>,
    pub set: Option<String>,
}

/// Fully resolved routes of an LMS client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routes {
    pub user: UserRoutes,
    pub enrollment: EnrollmentRoutes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRoutes {
    pub me: String,
    pub login: String,
    pub register: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentRoutes {
    pub get: String,
    pub set: String,
}

impl Routes {
    /// Default OpenEdX routes under `endpoint` (no trailing slash).
    pub fn openedx(endpoint: &str) -> Self {
        Self {
            user: UserRoutes {
                me: format!("{endpoint}/user/v2.0/whoami"),
                login: format!("{endpoint}/login"),
                register: format!("{endpoint}/register"),
            },
            enrollment: EnrollmentRoutes {
                get: format!("{endpoint}/api/enrollment/v1/enrollment/{USERNAME},{COURSE_ID}"),
                set: format!("{endpoint}/api/enrollment/v1/enrollment"),
            },
        }
    }

    /// Overlay `overrides` field by field.
    pub fn merged(self, overrides: &RouteOverrides) -> Self {
        fn pick(default: String, value: &Option<String>) -> String {
            value.clone().unwrap_or(default)
        }

        let Routes { user, enrollment } = self;
        Self {
            user: UserRoutes {
                me: pick(user.me, &overrides.user.me),
                login: pick(user.login, &overrides.user.login),
                register: pick(user.register, &overrides.user.register),
            },
            enrollment: EnrollmentRoutes {
                get: pick(enrollment.get, &overrides.enrollment.get),
                set: pick(enrollment.set, &overrides.enrollment.set),
            },
        }
    }
}

impl EnrollmentRoutes {
    /// Enrollment lookup URL. Anonymous lookups drop the `:username,` part.
    pub fn get_url(&self, username: Option<&str>, course_id: &str) -> String {
        let template = match username {
            Some(username) => self.get.replace(USERNAME, username),
            None => self.get.replace(&format!("{USERNAME},"), ""),
        };
        template.replace(COURSE_ID, course_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENDPOINT: &str = "https://demo.endpoint/api";

    #[test]
    fn test_openedx_defaults() {
        let routes = Routes::openedx(ENDPOINT);
        assert_eq!(routes.user.me, "https://demo.endpoint/api/user/v2.0/whoami");
        assert_eq!(routes.user.login, "https://demo.endpoint/api/login");
        assert_eq!(
            routes.enrollment.set,
            "https://demo.endpoint/api/api/enrollment/v1/enrollment"
        );
    }

    #[test]
    fn test_overrides_replace_only_given_fields() {
        let overrides = RouteOverrides {
            user: UserRouteOverrides {
                me: Some(format!("{ENDPOINT}/my-custom-api/user/v2.0/whoami")),
                ..Default::default()
            },
            ..Default::default()
        };

        let routes = Routes::openedx(ENDPOINT).merged(&overrides);

        assert_eq!(
            routes.user.me,
            "https://demo.endpoint/api/my-custom-api/user/v2.0/whoami"
        );
        assert_eq!(routes.user.login, Routes::openedx(ENDPOINT).user.login);
        assert_eq!(routes.enrollment, Routes::openedx(ENDPOINT).enrollment);
    }

    #[test]
    fn test_enrollment_get_url() {
        let routes = Routes::openedx(ENDPOINT);
        assert_eq!(
            routes.enrollment.get_url(Some("jdoe"), "abc"),
            "https://demo.endpoint/api/api/enrollment/v1/enrollment/jdoe,abc"
        );
        assert_eq!(
            routes.enrollment.get_url(None, "abc"),
            "https://demo.endpoint/api/api/enrollment/v1/enrollment/abc"
        );
    }

    #[test]
    fn test_options_deserialize_from_camel_case() {
        let options: ApiOptions = serde_json::from_str(
            r#"{"siteName": "richie-ap", "routes": {"user": {"me": "https://x.test/me"}}}"#,
        )
        .unwrap();
        assert_eq!(options.site_name.as_deref(), Some("richie-ap"));
        assert_eq!(options.routes.user.me.as_deref(), Some("https://x.test/me"));
        assert!(options.routes.enrollment.get.is_none());
    }
}
