//! Joanie client against a mock server: routes, bearer token and error
//! reporting.

use httpmock::prelude::*;
use joanie::model::{
    AddressPayload, ContractArchiveRequest, ContractResourceQuery, ContractState,
};
use joanie::resources::{ResourceError, ResourceManager, ResourceStates};
use joanie::JoanieApi;
use richie_http::{ApiError, TracedClient};
use serde_json::json;
use tracing_test::traced_test;

const TOKEN: &str = "joanie-jwt";

fn api(server: &MockServer) -> JoanieApi {
    JoanieApi::new(TracedClient::default(), &server.base_url())
        .with_access_token(Some(TOKEN.to_string()))
}

fn address_json(id: &str, is_main: bool) -> serde_json::Value {
    json!({
        "id": id,
        "title": "Home",
        "first_name": "John",
        "last_name": "Doe",
        "address": "1 rue de Rivoli",
        "postcode": "75001",
        "city": "Paris",
        "country": "FR",
        "is_main": is_main,
    })
}

fn payload() -> AddressPayload {
    AddressPayload {
        title: "Office".into(),
        first_name: "John".into(),
        last_name: "Doe".into(),
        address: "2 avenue de France".into(),
        postcode: "75013".into(),
        city: "Paris".into(),
        country: "FR".into(),
        is_main: false,
    }
}

mod addresses {
    use super::*;

    #[tokio::test]
    async fn list_sends_bearer_token() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v1.0/addresses/")
                .header("authorization", format!("Bearer {TOKEN}"));
            then.status(200)
                .json_body(json!([address_json("a1", true), address_json("a2", false)]));
        });

        let addresses = api(&server).addresses().list().await.unwrap();

        m.assert();
        assert_eq!(addresses.len(), 2);
        assert!(addresses[0].is_main);
    }

    #[tokio::test]
    async fn create_posts_payload() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST)
                .path("/api/v1.0/addresses/")
                .json_body(serde_json::to_value(payload()).unwrap());
            then.status(201).json_body(address_json("a3", false));
        });

        let created = api(&server).addresses().create(&payload()).await.unwrap();

        m.assert();
        assert_eq!(created.id, "a3");
    }

    #[traced_test]
    #[tokio::test]
    async fn create_failure_keeps_localized_message() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/v1.0/addresses/");
            then.status(400)
                .json_body(json!({"localizedMessage": "Adresse invalide"}));
        });

        let err = api(&server).addresses().create(&payload()).await.unwrap_err();

        let http = err.as_http().unwrap();
        assert_eq!(http.code, 400);
        assert_eq!(http.message, "Bad Request");
        assert_eq!(http.localized_message.as_deref(), Some("Adresse invalide"));
        assert!(logs_contain("[CREATE - Addresses] > 400 - Bad Request"));
    }

    #[tokio::test]
    async fn update_and_delete_use_item_routes() {
        let server = MockServer::start();
        let put = server.mock(|when, then| {
            let mut body = address_json("a1", true);
            body.as_object_mut().unwrap().remove("id");
            when.method(PUT).path("/api/v1.0/addresses/a1/").json_body(body);
            then.status(200).json_body(address_json("a1", true));
        });
        let delete = server.mock(|when, then| {
            when.method(DELETE).path("/api/v1.0/addresses/a2/");
            then.status(204);
        });

        let api = api(&server).addresses();
        let mut address = api_address("a1");
        address.is_main = true;
        assert!(api.update(&address).await.unwrap().is_main);
        api.delete("a2").await.unwrap();

        put.assert();
        delete.assert();
    }

    fn api_address(id: &str) -> joanie::model::Address {
        serde_json::from_value(address_json(id, false)).unwrap()
    }
}

mod managers {
    use super::*;

    #[tokio::test]
    async fn safe_delete_refuses_main_address() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/v1.0/addresses/");
            then.status(200)
                .json_body(json!([address_json("a1", true), address_json("a2", false)]));
        });
        let manager = ResourceManager::new(api(&server).addresses());
        manager.refresh().await.unwrap();

        let err = manager.safe_delete("a1").await.unwrap_err();

        assert!(matches!(err, ResourceError::MainEntry(_)));
        assert_eq!(
            manager.states().error.as_deref(),
            Some("Cannot delete main address.")
        );
        assert_eq!(manager.items().len(), 2);
    }

    #[tokio::test]
    async fn promote_updates_then_refetches() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/v1.0/credit-cards/");
            then.status(200).json_body(json!([
                {"id": "c1", "expiration_month": 1, "expiration_year": 2030, "last_numbers": "1234", "is_main": true},
                {"id": "c2", "expiration_month": 2, "expiration_year": 2031, "last_numbers": "5678", "is_main": false},
            ]));
        });
        let put = server.mock(|when, then| {
            when.method(PUT)
                .path("/api/v1.0/credit-cards/c2/")
                .json_body(json!({"title": null, "is_main": true}));
            then.status(200).json_body(json!(
                {"id": "c2", "expiration_month": 2, "expiration_year": 2031, "last_numbers": "5678", "is_main": true}
            ));
        });

        let manager = ResourceManager::new(api(&server).credit_cards());
        manager.refresh().await.unwrap();
        manager.promote("c2").await.unwrap();

        put.assert();
        assert_eq!(manager.items().len(), 2);
        assert_eq!(manager.states(), ResourceStates::default());
    }

    #[tokio::test]
    async fn failed_fetch_sets_generic_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/v1.0/addresses/");
            then.status(500).body("<html>oops</html>");
        });

        let manager = ResourceManager::new(api(&server).addresses());
        let err = manager.refresh().await.unwrap_err();

        assert!(matches!(err, ResourceError::Api(ApiError::Http(_))));
        assert_eq!(
            manager.states().error.as_deref(),
            Some("An error occurred while fetching addresses. Please retry later.")
        );
    }
}

mod orders {
    use super::*;

    #[tokio::test]
    async fn abort_posts_to_abort_route() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST).path("/api/v1.0/orders/o1/abort/");
            then.status(204);
        });

        api(&server).orders().abort("o1").await.unwrap();
        m.assert();
    }

    #[tokio::test]
    async fn list_is_paginated() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/v1.0/orders/")
                .query_param("product_id", "p1");
            then.status(200).json_body(json!({
                "count": 1,
                "next": null,
                "previous": null,
                "results": [{
                    "id": "o1",
                    "state": "completed",
                    "product_id": "p1",
                    "total": 42.0,
                    "total_currency": "EUR",
                    "created_on": "2024-03-01T10:00:00Z",
                }],
            }));
        });

        let query = joanie::model::OrderQuery {
            product_id: Some("p1".into()),
            ..Default::default()
        };
        let page = api(&server).orders().list(&query).await.unwrap();

        assert_eq!(page.count, 1);
        assert_eq!(page.results[0].state, joanie::model::OrderState::Completed);
    }
}

mod contracts {
    use super::*;

    #[tokio::test]
    async fn list_sends_filters() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v1.0/contracts/")
                .query_param("organization_id", "org-1")
                .query_param("signature_state", "signed");
            then.status(200)
                .json_body(json!({"count": 0, "next": null, "previous": null, "results": []}));
        });

        let query = ContractResourceQuery {
            organization_id: Some("org-1".into()),
            signature_state: Some(ContractState::Signed),
            ..Default::default()
        };
        let page = api(&server).contracts().list(&query).await.unwrap();

        m.assert();
        assert!(page.results.is_empty());
    }

    #[tokio::test]
    async fn download_returns_bytes() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/v1.0/contracts/c1/download/");
            then.status(200).body("%PDF-1.4");
        });

        let body = api(&server).contracts().download("c1").await.unwrap();
        assert_eq!(&body[..], b"%PDF-1.4");
    }

    #[tokio::test]
    async fn organization_contracts_route() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v1.0/organizations/org-1/contracts/")
                .query_param("offering_id", "off-1");
            then.status(200)
                .json_body(json!({"count": 0, "next": null, "previous": null, "results": []}));
        });

        let query = ContractResourceQuery {
            offering_id: Some("off-1".into()),
            ..Default::default()
        };
        api(&server)
            .organizations()
            .contracts("org-1", &query)
            .await
            .unwrap();
        m.assert();
    }
}

mod archives {
    use super::*;

    #[tokio::test]
    async fn create_returns_id_from_url() {
        let server = MockServer::start();
        let url = server.url("/api/v1.0/contracts/zip-archive/3f2a/");
        let m = server.mock(|when, then| {
            when.method(POST)
                .path("/api/v1.0/contracts/zip-archive/")
                .json_body(json!({"organization_id": "org-1"}));
            then.status(202).json_body(json!({"url": url}));
        });

        let request = ContractArchiveRequest {
            organization_id: Some("org-1".into()),
            offering_id: None,
        };
        let id = api(&server).contract_archives().create(&request).await.unwrap();

        m.assert();
        assert_eq!(id, "3f2a");
    }

    #[tokio::test]
    async fn create_rejects_url_without_id() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/v1.0/contracts/zip-archive/");
            then.status(202).json_body(json!({"url": ""}));
        });

        let err = api(&server)
            .contract_archives()
            .create(&ContractArchiveRequest::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::UnexpectedPayload(_)), "{err:?}");
        assert_eq!(err.status(), None);
    }

    #[tokio::test]
    async fn check_maps_statuses() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(httpmock::Method::OPTIONS)
                .path("/api/v1.0/contracts/zip-archive/ready/");
            then.status(200);
        });
        server.mock(|when, then| {
            when.method(httpmock::Method::OPTIONS)
                .path("/api/v1.0/contracts/zip-archive/absent/");
            then.status(404);
        });
        server.mock(|when, then| {
            when.method(httpmock::Method::OPTIONS)
                .path("/api/v1.0/contracts/zip-archive/broken/");
            then.status(500);
        });

        let archives = api(&server).contract_archives();
        assert!(archives.check("ready").await.unwrap());
        assert!(!archives.check("absent").await.unwrap());
        assert_eq!(archives.check("broken").await.unwrap_err().status(), Some(500));
    }
}
