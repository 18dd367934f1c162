//! Repository provisioning endpoints.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use nexus_manager_core::{
    manager::PrivilegeManager,
    models::{Action, OperationSummary, RepositoryRequest},
    validation::RequestValidator,
};
use serde_json::{Value, json};

use crate::error::ApiError;
use crate::state::AppState;

/// Create a proxy repository with its privilege and role binding.
///
/// POST /api/repository
pub async fn create_repository(
    State(state): State<AppState>,
    payload: Result<Json<RepositoryRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    handle_operation(&state, Action::Create, &request).await
}

/// Delete a proxy repository with its privilege and role binding.
///
/// DELETE /api/repository
pub async fn delete_repository(
    State(state): State<AppState>,
    payload: Result<Json<RepositoryRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    handle_operation(&state, Action::Delete, &request).await
}

async fn handle_operation(
    state: &AppState,
    action: Action,
    request: &RepositoryRequest,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let config = RequestValidator::new(&state.catalog, &state.settings).resolve(action, request)?;

    PrivilegeManager::new(&config)?.run().await?;

    let summary = OperationSummary::from(&config);
    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": summary,
            "message": format!("Successfully {} repository and privileges.", action.past_tense()),
        })),
    ))
}
