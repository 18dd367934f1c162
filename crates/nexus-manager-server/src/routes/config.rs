//! Configuration discovery endpoint.

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;

use crate::state::AppState;

/// Lists the organizations and package managers requests may reference.
///
/// GET /api/config
pub async fn get_config(State(state): State<AppState>) -> impl IntoResponse {
    let shared = state
        .catalog
        .shared_package_managers(&state.settings.shared_package_managers());

    Json(json!({
        "success": true,
        "data": {
            "organizations": state.catalog.organizations(),
            "package_managers": state.catalog.proxy_package_managers(),
            "shared_package_managers": shared,
        }
    }))
}
