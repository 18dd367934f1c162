//! HTTP route handlers.

pub mod config;
pub mod docs;
pub mod health;
pub mod repository;

use axum::{
    Router,
    extract::OriginalUri,
    http::{Method, StatusCode},
    routing::{get, post},
};
use tower_http::catch_panic::CatchPanicLayer;

use crate::error::{ApiError, handle_panic};
use crate::state::AppState;

/// Creates the API router. Mounted under `/api` by [`app`].
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/config", get(config::get_config))
        .route("/docs", get(docs::get_docs))
        .route(
            "/repository",
            post(repository::create_repository).delete(repository::delete_repository),
        )
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(state)
}

/// Creates the application: the API under `/api`, with panics and unknown
/// routes rendered as error envelopes.
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_router(state))
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
}

async fn not_found(OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, format!("Not found: {}", uri.path()))
}

async fn method_not_allowed(method: Method, OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::new(
        StatusCode::METHOD_NOT_ALLOWED,
        format!("Method {} not allowed for {}", method, uri.path()),
    )
}
