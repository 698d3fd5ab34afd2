//! Backend locator: which configured LMS a course link belongs to.

use regex::Regex;
use richie_http::ApiError;
use runtime::LmsBackendConfig;

const COURSE_ID_GROUP: &str = "course_id";

/// Compiled `course_regexp` of a backend.
#[derive(Debug, Clone)]
pub struct CoursePattern(Regex);

impl CoursePattern {
    pub fn new(pattern: &str) -> Result<Self, ApiError> {
        Regex::new(pattern)
            .map(Self)
            .map_err(|e| ApiError::configuration(format!("invalid course_regexp '{pattern}': {e}")))
    }

    pub fn matches(&self, resource_link: &str) -> bool {
        self.0.is_match(resource_link)
    }

    /// Course id captured by the `course_id` named group, or by the first
    /// group when the pattern has no named group.
    pub fn extract_course_id(&self, resource_link: &str) -> Result<String, ApiError> {
        let captures = self.0.captures(resource_link).ok_or_else(|| {
            ApiError::resource_link(format!("'{resource_link}' does not match the course pattern"))
        })?;

        captures
            .name(COURSE_ID_GROUP)
            .or_else(|| captures.get(1))
            .map(|m| m.as_str().to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                ApiError::resource_link(format!("no course id found in '{resource_link}'"))
            })
    }
}

/// First backend, in configuration order, whose pattern matches the link.
///
/// `None` means the course run is not hosted by a configured LMS and should be
/// rendered as a plain link. Backends with an invalid pattern never match.
pub fn find_lms_backend<'a>(
    resource_link: &str,
    backends: &'a [LmsBackendConfig],
) -> Option<&'a LmsBackendConfig> {
    backends.iter().find(|backend| match Regex::new(&backend.course_regexp) {
        Ok(re) => re.is_match(resource_link),
        Err(e) => {
            tracing::warn!(
                backend = backend.backend.as_str(),
                endpoint = %backend.endpoint,
                error = %e,
                "ignoring LMS backend with invalid course_regexp"
            );
            false
        }
    })
}

pub fn extract_course_id(resource_link: &str, config: &LmsBackendConfig) -> Result<String, ApiError> {
    CoursePattern::new(&config.course_regexp)?.extract_course_id(resource_link)
}

#[cfg(test)]
mod tests {
    use super::*;
    use runtime::LmsBackendKind;

    fn backend(kind: LmsBackendKind, endpoint: &str, pattern: &str) -> LmsBackendConfig {
        LmsBackendConfig {
            backend: kind,
            endpoint: endpoint.to_string(),
            course_regexp: pattern.to_string(),
        }
    }

    #[test]
    fn test_first_matching_backend_wins() {
        let backends = vec![
            backend(
                LmsBackendKind::OpenedxHawthorn,
                "https://lms-a.test",
                r"^https://lms-a\.test/courses/(?<course_id>[^/]+)/",
            ),
            backend(LmsBackendKind::Dummy, "https://catch-all.test", ".*"),
            backend(
                LmsBackendKind::OpenedxFonzie,
                "https://lms-a.test",
                r"^https://lms-a\.test/.*",
            ),
        ];

        let found = find_lms_backend("https://lms-a.test/courses/abc/info", &backends).unwrap();
        assert_eq!(found.backend, LmsBackendKind::OpenedxHawthorn);

        let found = find_lms_backend("https://elsewhere.test/course", &backends).unwrap();
        assert_eq!(found.backend, LmsBackendKind::Dummy);
    }

    #[test]
    fn test_no_match() {
        let backends = vec![backend(
            LmsBackendKind::OpenedxHawthorn,
            "https://lms.test",
            r"^https://lms\.test/",
        )];
        assert!(find_lms_backend("https://www.example.com/course", &backends).is_none());
        assert!(find_lms_backend("https://lms.test/x", &[]).is_none());
    }

    #[test]
    fn test_invalid_pattern_never_matches() {
        let backends = vec![
            backend(LmsBackendKind::OpenedxHawthorn, "https://a.test", "(unclosed"),
            backend(LmsBackendKind::Dummy, "https://b.test", ".*"),
        ];
        let found = find_lms_backend("https://a.test/x", &backends).unwrap();
        assert_eq!(found.backend, LmsBackendKind::Dummy);
    }

    #[test]
    fn test_extract_named_course_id() {
        let config = backend(
            LmsBackendKind::OpenedxHawthorn,
            "https://demo.endpoint/api",
            "course_id=(?<course_id>.*$)",
        );
        let id = extract_course_id(
            "https://demo.endpoint/courses?course_id=course-v1:fun+101+run01",
            &config,
        )
        .unwrap();
        assert_eq!(id, "course-v1:fun+101+run01");
    }

    #[test]
    fn test_extract_falls_back_to_first_group() {
        let pattern = CoursePattern::new(r"/courses/([^/]+)/info").unwrap();
        assert_eq!(
            pattern
                .extract_course_id("https://lms.test/courses/abc/info")
                .unwrap(),
            "abc"
        );
    }

    #[test]
    fn test_extract_without_match_is_resource_link_error() {
        let pattern = CoursePattern::new("course_id=(?<course_id>.*$)").unwrap();
        assert!(matches!(
            pattern.extract_course_id("https://lms.test/nothing"),
            Err(ApiError::ResourceLink(_))
        ));
        // Pattern matches but captures nothing.
        assert!(matches!(
            pattern.extract_course_id("https://lms.test/?course_id="),
            Err(ApiError::ResourceLink(_))
        ));
    }

    #[test]
    fn test_invalid_pattern_is_configuration_error() {
        assert!(matches!(
            CoursePattern::new("(unclosed"),
            Err(ApiError::Configuration(_))
        ));
    }
}
