//! API integration tests for nexus-manager-server.
//!
//! Nexus and IQ Server are replaced by a wiremock server; both remote systems
//! share its address.

use axum_test::TestServer;
use nexus_manager_core::catalog::Catalog;
use nexus_manager_core::config::Settings;
use nexus_manager_server::AppState;
use nexus_manager_server::test_utils::{create_test_app, setup_test_state, test_catalog};
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REPO: &str = "/service/rest/v1/repositories/npm-release-svc1";
const PRIVILEGE: &str = "/service/rest/v1/security/privileges/npm-release-svc1";
const ROLE: &str = "/service/rest/v1/security/roles/jdoe";
const USERS: &str = "/service/rest/v1/security/users";

/// Helper to create a test server backed by `remote`.
async fn create_server(remote: &MockServer) -> TestServer {
    let app = create_test_app(setup_test_state(&remote.uri()));
    TestServer::new(app).expect("Failed to create test server")
}

fn npm_request() -> Value {
    json!({
        "organization_name_chinese": "测试组织",
        "ldap_username": "jdoe",
        "package_manager": "npm",
        "shared": false,
        "app_id": "svc1"
    })
}

async fn mount(server: &MockServer, verb: &str, route: &str, response: ResponseTemplate) {
    Mock::given(method(verb))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Mounts a Nexus where the repository, privilege and role already exist.
async fn mount_existing_objects(remote: &MockServer, repository: &str) {
    mount(
        remote,
        "GET",
        &format!("/service/rest/v1/repositories/{}", repository),
        ResponseTemplate::new(200).set_body_json(json!({
            "name": repository, "format": "npm", "type": "proxy",
            "attributes": {"proxy": {"remoteUrl": "https://registry.npmjs.org"}}
        })),
    )
    .await;
    mount(
        remote,
        "GET",
        &format!("/service/rest/v1/security/privileges/{}", repository),
        ResponseTemplate::new(200).set_body_json(json!({"name": repository, "repository": repository})),
    )
    .await;
    mount(
        remote,
        "GET",
        ROLE,
        ResponseTemplate::new(200).set_body_json(json!({
            "id": "jdoe", "name": "jdoe", "privileges": [repository], "roles": []
        })),
    )
    .await;
    mount(
        remote,
        "GET",
        USERS,
        ResponseTemplate::new(200).set_body_json(json!([{"userId": "jdoe", "roles": ["developers", "jdoe"]}])),
    )
    .await;
}

// =============================================================================
// Health & Docs Tests
// =============================================================================

mod health {
    use super::*;

    #[tokio::test]
    async fn health_check_returns_healthy() {
        let remote = MockServer::start().await;
        let server = create_server(&remote).await;

        let response = server.get("/api/health").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["status"], "healthy");
        assert!(body["version"].is_string());
    }

    #[tokio::test]
    async fn docs_describe_endpoints() {
        let remote = MockServer::start().await;
        let server = create_server(&remote).await;

        let response = server.get("/api/docs").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["name"], "Nexus Repository Manager API");
        assert!(body["endpoints"]["POST /api/repository"].is_object());
        assert!(body["endpoints"]["DELETE /api/repository"].is_object());
    }
}

// =============================================================================
// Error Envelope Tests
// =============================================================================

mod envelope {
    use super::*;
    use axum::{Router, http::StatusCode, routing::get};
    use nexus_manager_server::error::handle_panic;
    use tower_http::catch_panic::CatchPanicLayer;

    #[tokio::test]
    async fn unsupported_method_returns_envelope() {
        let remote = MockServer::start().await;
        let server = create_server(&remote).await;

        let response = server.put("/api/repository").json(&npm_request()).await;

        response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("PUT"));
    }

    #[tokio::test]
    async fn unknown_route_returns_envelope() {
        let remote = MockServer::start().await;
        let server = create_server(&remote).await;

        let response = server.get("/api/repositories").await;

        response.assert_status_not_found();
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Not found: /api/repositories");
    }

    #[tokio::test]
    async fn unknown_route_outside_api_returns_envelope() {
        let remote = MockServer::start().await;
        let server = create_server(&remote).await;

        let response = server.get("/health").await;

        response.assert_status_not_found();
        let body: Value = response.json();
        assert_eq!(body["success"], false);
    }

    async fn panicking_handler() -> &'static str {
        panic!("handler exploded")
    }

    #[tokio::test]
    async fn handler_panic_returns_internal_error_envelope() {
        let app = Router::new()
            .route("/api/explode", get(panicking_handler))
            .layer(CatchPanicLayer::custom(handle_panic));
        let server = TestServer::new(app).unwrap();

        let response = server.get("/api/explode").await;

        response.assert_status_internal_server_error();
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Internal server error");
    }
}

// =============================================================================
// Config Tests
// =============================================================================

mod config {
    use super::*;

    #[tokio::test]
    async fn config_lists_catalog() {
        let remote = MockServer::start().await;
        let server = create_server(&remote).await;

        let response = server.get("/api/config").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["organizations"][0]["chineseName"], "测试组织");
        assert_eq!(body["data"]["package_managers"], json!(["maven2", "npm"]));
        assert_eq!(body["data"]["shared_package_managers"], json!(["npm", "maven2"]));
    }

    #[tokio::test]
    async fn config_with_empty_catalog() {
        let state = AppState::new(Catalog::default(), Settings::default());
        let server = TestServer::new(create_test_app(state)).unwrap();

        let response = server.get("/api/config").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["organizations"], json!([]));
        assert_eq!(body["data"]["package_managers"], json!([]));
    }
}

// =============================================================================
// Validation Tests
// =============================================================================

mod validation {
    use super::*;

    #[tokio::test]
    async fn missing_fields_are_listed_together() {
        let remote = MockServer::start().await;
        let server = create_server(&remote).await;

        let response = server
            .post("/api/repository")
            .json(&json!({"package_manager": "npm", "app_id": "svc1"}))
            .await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(
            body["error"],
            "Missing required fields: organization_name_chinese, ldap_username"
        );
    }

    #[tokio::test]
    async fn non_shared_requires_app_id() {
        let remote = MockServer::start().await;
        let server = create_server(&remote).await;

        let mut payload = npm_request();
        payload["app_id"] = json!("");

        let response = server.post("/api/repository").json(&payload).await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert!(body["error"].as_str().unwrap().contains("app_id"));
    }

    #[tokio::test]
    async fn unknown_organization_is_rejected() {
        let remote = MockServer::start().await;
        let server = create_server(&remote).await;

        let mut payload = npm_request();
        payload["organization_name_chinese"] = json!("不存在的组织");

        let response = server.delete("/api/repository").json(&payload).await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(
            body["error"],
            "Organization with Chinese name '不存在的组织' not found."
        );
    }

    #[tokio::test]
    async fn unknown_package_manager_makes_no_remote_calls() {
        let remote = MockServer::start().await;
        let server = create_server(&remote).await;

        let mut payload = npm_request();
        payload["package_manager"] = json!("cargo");

        let response = server.post("/api/repository").json(&payload).await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert!(body["error"].as_str().unwrap().contains("cargo"));
        assert!(remote.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn package_manager_without_default_url_is_rejected() {
        let remote = MockServer::start().await;
        let server = create_server(&remote).await;

        let mut payload = npm_request();
        payload["package_manager"] = json!("docker");

        let response = server.post("/api/repository").json(&payload).await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["error"], "No default URL configured for package manager: docker");
    }

    #[tokio::test]
    async fn package_manager_must_match_catalog_key_exactly() {
        let remote = MockServer::start().await;
        let server = create_server(&remote).await;

        let mut payload = npm_request();
        payload["package_manager"] = json!("NPM");

        let response = server.post("/api/repository").json(&payload).await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["error"], "No default URL configured for package manager: NPM");
        assert!(remote.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let remote = MockServer::start().await;
        let server = create_server(&remote).await;

        let response = server
            .post("/api/repository")
            .content_type("application/json")
            .bytes("{not json".into())
            .await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn missing_content_type_is_unsupported_media_type() {
        let remote = MockServer::start().await;
        let server = create_server(&remote).await;

        let response = server
            .post("/api/repository")
            .text(npm_request().to_string())
            .await;

        response.assert_status(axum::http::StatusCode::UNSUPPORTED_MEDIA_TYPE);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn missing_system_configuration_is_server_error() {
        let state = AppState::new(test_catalog(), Settings::default());
        let server = TestServer::new(create_test_app(state)).unwrap();

        let response = server.post("/api/repository").json(&npm_request()).await;

        response.assert_status_internal_server_error();
        let body: Value = response.json();
        assert!(
            body["error"]
                .as_str()
                .unwrap()
                .starts_with("Missing system configuration: NEXUS_URL")
        );
    }
}

// =============================================================================
// Repository Tests
// =============================================================================

mod repository {
    use super::*;

    #[tokio::test]
    async fn create_repository_success() {
        let remote = MockServer::start().await;
        mount(&remote, "GET", REPO, ResponseTemplate::new(404)).await;
        mount(&remote, "GET", PRIVILEGE, ResponseTemplate::new(404)).await;
        mount(&remote, "GET", ROLE, ResponseTemplate::new(404)).await;
        mount(&remote, "POST", "/service/rest/v1/repositories/npm/proxy", ResponseTemplate::new(201)).await;
        mount(
            &remote,
            "POST",
            "/service/rest/v1/security/privileges/repository-view",
            ResponseTemplate::new(201),
        )
        .await;
        mount(&remote, "POST", "/service/rest/v1/security/roles", ResponseTemplate::new(200)).await;
        mount(
            &remote,
            "GET",
            USERS,
            ResponseTemplate::new(200).set_body_json(json!([{"userId": "jdoe", "roles": []}])),
        )
        .await;
        mount(&remote, "PUT", "/service/rest/v1/security/users/jdoe", ResponseTemplate::new(204)).await;
        let server = create_server(&remote).await;

        let response = server.post("/api/repository").json(&npm_request()).await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Successfully created repository and privileges.");
        assert_eq!(body["data"]["action"], "create");
        assert_eq!(body["data"]["repository_name"], "npm-release-svc1");
        assert_eq!(body["data"]["privilege_name"], "npm-release-svc1");
        assert_eq!(body["data"]["role_name"], "jdoe");
        assert_eq!(body["data"]["organization_id"], "org-42");
        assert_eq!(body["data"]["app_id"], "svc1");
    }

    #[tokio::test]
    async fn create_is_idempotent() {
        let remote = MockServer::start().await;
        mount_existing_objects(&remote, "npm-release-svc1").await;
        let server = create_server(&remote).await;

        let first = server.post("/api/repository").json(&npm_request()).await;
        let second = server.post("/api/repository").json(&npm_request()).await;

        first.assert_status_ok();
        second.assert_status_ok();
        let first: Value = first.json();
        let second: Value = second.json();
        assert_eq!(first["data"], second["data"]);

        let writes = remote
            .received_requests()
            .await
            .unwrap()
            .into_iter()
            .filter(|r| r.url.path().starts_with("/service/rest") && r.method.as_str() != "GET")
            .count();
        assert_eq!(writes, 0);
    }

    #[tokio::test]
    async fn create_shared_repository() {
        let remote = MockServer::start().await;
        mount_existing_objects(&remote, "npm-release-shared").await;
        let server = create_server(&remote).await;

        let response = server
            .post("/api/repository")
            .json(&json!({
                "organization_name_chinese": "测试组织",
                "ldap_username": "jdoe",
                "package_manager": "npm",
                "shared": true
            }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["repository_name"], "npm-release-shared");
        assert_eq!(body["data"]["shared"], true);
        assert!(body["data"]["app_id"].is_null());
    }

    #[tokio::test]
    async fn delete_of_absent_objects_succeeds() {
        let remote = MockServer::start().await;
        mount(&remote, "GET", ROLE, ResponseTemplate::new(404)).await;
        mount(&remote, "DELETE", PRIVILEGE, ResponseTemplate::new(404)).await;
        mount(&remote, "DELETE", REPO, ResponseTemplate::new(404)).await;
        let server = create_server(&remote).await;

        let response = server.delete("/api/repository").json(&npm_request()).await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["message"], "Successfully deleted repository and privileges.");
        assert_eq!(body["data"]["action"], "delete");
    }

    #[tokio::test]
    async fn delete_targets_what_create_produced() {
        let remote = MockServer::start().await;
        mount(&remote, "GET", REPO, ResponseTemplate::new(404)).await;
        mount(&remote, "GET", PRIVILEGE, ResponseTemplate::new(404)).await;
        mount(&remote, "POST", "/service/rest/v1/repositories/npm/proxy", ResponseTemplate::new(201)).await;
        mount(
            &remote,
            "POST",
            "/service/rest/v1/security/privileges/repository-view",
            ResponseTemplate::new(201),
        )
        .await;
        mount(&remote, "POST", "/service/rest/v1/security/roles", ResponseTemplate::new(200)).await;
        mount(&remote, "PUT", "/service/rest/v1/security/users/jdoe", ResponseTemplate::new(204)).await;

        // Role and user are absent before CREATE and reflect its writes afterwards.
        Mock::given(method("GET"))
            .and(path(ROLE))
            .respond_with(ResponseTemplate::new(404))
            .up_to_n_times(1)
            .mount(&remote)
            .await;
        mount(
            &remote,
            "GET",
            ROLE,
            ResponseTemplate::new(200).set_body_json(json!({
                "id": "jdoe", "name": "jdoe", "privileges": ["npm-release-svc1"], "roles": []
            })),
        )
        .await;
        Mock::given(method("GET"))
            .and(path(USERS))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"userId": "jdoe", "roles": []}])))
            .up_to_n_times(1)
            .mount(&remote)
            .await;
        mount(
            &remote,
            "GET",
            USERS,
            ResponseTemplate::new(200).set_body_json(json!([{"userId": "jdoe", "roles": ["developers", "jdoe"]}])),
        )
        .await;

        for route in [ROLE, PRIVILEGE, REPO] {
            mount(&remote, "DELETE", route, ResponseTemplate::new(204)).await;
        }
        let server = create_server(&remote).await;

        let created = server.post("/api/repository").json(&npm_request()).await;
        let deleted = server.delete("/api/repository").json(&npm_request()).await;

        created.assert_status_ok();
        deleted.assert_status_ok();
        let created: Value = created.json();
        let deleted: Value = deleted.json();
        assert_eq!(created["data"]["repository_name"], deleted["data"]["repository_name"]);
        assert_eq!(created["data"]["privilege_name"], deleted["data"]["privilege_name"]);

        let deleted_paths: Vec<String> = remote
            .received_requests()
            .await
            .unwrap()
            .into_iter()
            .filter(|r| r.method.as_str() == "DELETE")
            .map(|r| r.url.path().to_string())
            .collect();
        assert_eq!(deleted_paths, vec![ROLE, PRIVILEGE, REPO]);
    }

    #[tokio::test]
    async fn remote_failure_is_server_error() {
        let remote = MockServer::start().await;
        mount(
            &remote,
            "GET",
            REPO,
            ResponseTemplate::new(401).set_body_string("Unauthorized"),
        )
        .await;
        let server = create_server(&remote).await;

        let response = server.post("/api/repository").json(&npm_request()).await;

        response.assert_status_internal_server_error();
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("401"));
    }

    #[tokio::test]
    async fn conflicting_repository_is_server_error() {
        let remote = MockServer::start().await;
        mount(
            &remote,
            "GET",
            REPO,
            ResponseTemplate::new(200).set_body_json(json!({
                "name": "npm-release-svc1", "format": "maven2", "type": "proxy"
            })),
        )
        .await;
        let server = create_server(&remote).await;

        let response = server.post("/api/repository").json(&npm_request()).await;

        response.assert_status_internal_server_error();
        let body: Value = response.json();
        assert!(body["error"].as_str().unwrap().starts_with("Conflict:"));
    }
}
