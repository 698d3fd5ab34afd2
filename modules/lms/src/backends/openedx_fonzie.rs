use crate::options::Routes;

/// OpenEdX routes with Fonzie's "me" endpoint, served by the authentication
/// backend and returning the user's JWT.
pub fn fonzie_routes(endpoint: &str, authentication_endpoint: &str) -> Routes {
    let mut routes = Routes::openedx(endpoint);
    routes.user.me = format!("{authentication_endpoint}/api/v1.0/user/me");
    routes
}
