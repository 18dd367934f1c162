//! Static API description.

use axum::{Json, response::IntoResponse};
use serde_json::json;

/// GET /api/docs
pub async fn get_docs() -> impl IntoResponse {
    let request_body = json!({
        "organization_name_chinese": "string (required)",
        "ldap_username": "string (required)",
        "package_manager": "string (required)",
        "shared": "boolean (optional, default false)",
        "app_id": "string (required when shared is false)"
    });

    Json(json!({
        "name": "Nexus Repository Manager API",
        "version": nexus_manager_core::VERSION,
        "endpoints": {
            "GET /api/health": {
                "description": "Service health check"
            },
            "GET /api/config": {
                "description": "Available organizations and package managers"
            },
            "POST /api/repository": {
                "description": "Create a proxy repository, its privilege and the user's role binding",
                "body": request_body.clone()
            },
            "DELETE /api/repository": {
                "description": "Delete the proxy repository, its privilege and the user's role binding",
                "body": request_body
            },
            "GET /api/docs": {
                "description": "This document"
            }
        }
    }))
}
