//! Browser-location indirection used by login/register redirects.

use parking_lot::Mutex;

/// Literal prefix used when neither an option nor the environment names the site.
pub const DEFAULT_SITE_NAME: &str = "richie";

/// Environment variable naming the deployment container.
pub const CONTAINER_NAME_ENV: &str = "RICHIE_CONTAINER_NAME";

/// Where the user currently is, and how to send them elsewhere.
pub trait Navigator: Send + Sync {
    fn current_path(&self) -> String;
    fn assign(&self, url: &str);
}

/// Prefix of the `next` parameter: explicit option, then the container
/// name, then [`DEFAULT_SITE_NAME`]. Empty values are skipped.
pub fn resolve_site_name(explicit: Option<&str>, container_name: Option<&str>) -> String {
    explicit
        .filter(|s| !s.is_empty())
        .or_else(|| container_name.filter(|s| !s.is_empty()))
        .unwrap_or(DEFAULT_SITE_NAME)
        .to_string()
}

/// `{route}?next={site_name}{current_path}`
pub fn redirect_url(route: &str, site_name: &str, current_path: &str) -> String {
    format!("{route}?next={site_name}{current_path}")
}

/// Navigator keeping the current path in memory and recording every
/// assignment. Used by the CLI and by tests.
#[derive(Debug)]
pub struct RecordingNavigator {
    path: Mutex<String>,
    assigned: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: Mutex::new(path.into()),
            assigned: Mutex::new(Vec::new()),
        }
    }

    pub fn set_path(&self, path: impl Into<String>) {
        *self.path.lock() = path.into();
    }

    pub fn assigned(&self) -> Vec<String> {
        self.assigned.lock().clone()
    }

    pub fn last_assigned(&self) -> Option<String> {
        self.assigned.lock().last().cloned()
    }
}

impl Default for RecordingNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for RecordingNavigator {
    fn current_path(&self) -> String {
        self.path.lock().clone()
    }

    fn assign(&self, url: &str) {
        tracing::debug!(url, "navigating");
        self.assigned.lock().push(url.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_name_resolution_order() {
        assert_eq!(resolve_site_name(Some("richie-ap"), Some("richie-br")), "richie-ap");
        assert_eq!(resolve_site_name(None, Some("richie-br")), "richie-br");
        assert_eq!(resolve_site_name(None, None), "richie");
        assert_eq!(resolve_site_name(Some(""), Some("")), "richie");
    }

    #[test]
    fn test_redirect_url() {
        assert_eq!(
            redirect_url("https://lms.test/login", "richie", "/test/path"),
            "https://lms.test/login?next=richie/test/path"
        );
    }

    #[test]
    fn test_recording_navigator() {
        let nav = RecordingNavigator::new("/a");
        nav.assign("https://x.test/1");
        nav.set_path("/b");
        nav.assign("https://x.test/2");

        assert_eq!(nav.current_path(), "/b");
        assert_eq!(nav.assigned(), vec!["https://x.test/1", "https://x.test/2"]);
        assert_eq!(nav.last_assigned().as_deref(), Some("https://x.test/2"));
    }
}
