//! Test utilities for nexus-manager-server integration tests.

use axum::Router;
use nexus_manager_core::catalog::{Catalog, Organization, PackageManagerFormat};
use nexus_manager_core::config::{self, EnvSchema, Settings};
use serde_json::json;

use crate::routes;
use crate::state::AppState;

/// Organization known to the test catalog.
pub const TEST_ORGANIZATION: &str = "测试组织";
pub const TEST_ORGANIZATION_ID: &str = "org-42";

/// Builds the catalog used by integration tests.
///
/// `npm` and `maven2` are proxyable; `docker` is listed without a default URL.
pub fn test_catalog() -> Catalog {
    Catalog::new(
        vec![
            Organization {
                id: TEST_ORGANIZATION_ID.to_string(),
                chinese_name: TEST_ORGANIZATION.to_string(),
                english_name: Some("Test Organization".to_string()),
            },
            Organization {
                id: "org-7".to_string(),
                chinese_name: "平台组".to_string(),
                english_name: None,
            },
        ],
        vec![
            PackageManagerFormat {
                name: "npm".to_string(),
                proxy_supported: true,
                default_url: "https://registry.npmjs.org".to_string(),
                ..Default::default()
            },
            PackageManagerFormat {
                name: "maven2".to_string(),
                proxy_supported: true,
                default_url: "https://repo1.maven.org/maven2/".to_string(),
                endpoint: Some("maven".to_string()),
                privilege_format: Some("maven2".to_string()),
                default_config: Some(json!({"versionPolicy": "RELEASE", "layoutPolicy": "STRICT"})),
            },
            PackageManagerFormat {
                name: "docker".to_string(),
                proxy_supported: true,
                ..Default::default()
            },
        ],
    )
}

/// Builds settings pointing both remote systems at `remote_url`.
pub fn test_settings(remote_url: &str) -> Settings {
    let schema = EnvSchema::from_keys([
        config::NEXUS_URL,
        config::NEXUS_USERNAME,
        config::NEXUS_PASSWORD,
        config::IQSERVER_URL,
        config::IQSERVER_USERNAME,
        config::IQSERVER_PASSWORD,
        config::EXTRA_ROLE,
        config::SHARED_PACKAGE_MANAGERS,
    ]);
    let remote_url = remote_url.to_string();
    Settings::from_lookup(&schema, move |key| match key {
        config::NEXUS_URL | config::IQSERVER_URL => Some(remote_url.clone()),
        config::NEXUS_USERNAME | config::IQSERVER_USERNAME => Some("admin".to_string()),
        config::NEXUS_PASSWORD | config::IQSERVER_PASSWORD => Some("admin123".to_string()),
        config::EXTRA_ROLE => Some("developers".to_string()),
        _ => None,
    })
}

/// Creates test application state whose remote systems live at `remote_url`.
pub fn setup_test_state(remote_url: &str) -> AppState {
    AppState::new(test_catalog(), test_settings(remote_url))
}

/// Creates the full application router for testing.
pub fn create_test_app(state: AppState) -> Router {
    routes::app(state)
}
