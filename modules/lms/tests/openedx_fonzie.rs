//! Fonzie profile: user comes from the authentication backend with a JWT
//! that authorizes the enrollment calls.

use std::sync::Arc;

use httpmock::prelude::*;
use lms::{LmsDeps, RecordingNavigator};
use richie_http::TracedClient;
use runtime::{AuthenticationBackend, LmsBackendConfig, LmsBackendKind, RichieContext};
use serde_json::json;

#[tokio::test]
async fn me_then_enroll_with_access_token() {
    let lms_server = MockServer::start();
    let auth_server = MockServer::start();

    let context = RichieContext {
        lms_backends: vec![LmsBackendConfig {
            backend: LmsBackendKind::OpenedxFonzie,
            endpoint: lms_server.base_url(),
            course_regexp: "course_id=(?<course_id>.*$)".to_string(),
        }],
        authentication: Some(AuthenticationBackend {
            backend: "openedx-fonzie".to_string(),
            endpoint: auth_server.base_url(),
        }),
        ..Default::default()
    };

    let me = auth_server.mock(|when, then| {
        when.method(GET).path("/api/v1.0/user/me");
        then.status(200).json_body(json!({
            "username": "jdoe",
            "full_name": "John Doe",
            "access_token": "jwt-token",
        }));
    });
    let enroll = lms_server.mock(|when, then| {
        when.method(POST)
            .path("/api/enrollment/v1/enrollment")
            .header("authorization", "Bearer jwt-token");
        then.status(200).json_body(json!({"is_active": true}));
    });

    let link = "https://lms.test/courses?course_id=course-v1-fun-101";
    let deps = LmsDeps::new(
        TracedClient::default(),
        Arc::new(RecordingNavigator::default()),
    );
    let api = lms::build_for_resource_link(&context, link, None, deps)
        .unwrap()
        .unwrap();

    let user = api.user().me().await.unwrap().unwrap();
    assert_eq!(user.access_token.as_deref(), Some("jwt-token"));
    assert_eq!(user.full_name.as_deref(), Some("John Doe"));

    assert!(api.enrollment().set(link, &user).await.unwrap());

    me.assert();
    enroll.assert();
}

#[tokio::test]
async fn me_is_none_without_session() {
    let auth_server = MockServer::start();
    auth_server.mock(|when, then| {
        when.method(GET).path("/api/v1.0/user/me");
        then.status(401);
    });

    let config = LmsBackendConfig {
        backend: LmsBackendKind::OpenedxFonzie,
        endpoint: "https://lms.test".to_string(),
        course_regexp: ".*".to_string(),
    };
    let deps = LmsDeps::new(
        TracedClient::default(),
        Arc::new(RecordingNavigator::default()),
    )
    .with_authentication_endpoint(Some(auth_server.base_url()));

    let api = lms::build(&config, None, deps).unwrap();
    assert_eq!(api.user().me().await.unwrap(), None);
}
