//! HTTP route handlers.
//!
//! All browser work is delegated to the publisher behind
//! [`crate::poster::BlogPublisher`]; handlers only translate between JSON
//! and that seam.

use std::sync::Arc;
use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use tracing::{error, info};

use crate::AppState;

/// JSON error response helper
fn err_response(status: StatusCode, msg: &str) -> impl IntoResponse {
    (status, Json(serde_json::json!({ "error": msg })))
}

/// Build the API router with all endpoints.
pub fn api_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/status", get(get_status))
        .route("/post-to-naver", post(post_to_naver))
        // Auth middleware (only if NAVER_POST_WEB_PASS is set)
        .layer(middleware::from_fn(super::auth::basic_auth_middleware))
        .layer(Extension(state))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn get_status(
    Extension(state): Extension<Arc<AppState>>,
) -> impl IntoResponse {
    Json(state.publisher.status())
}

#[derive(Debug, serde::Deserialize)]
pub struct PostRequest {
    pub title: String,
    pub body: String,
}

#[derive(Debug, serde::Serialize)]
pub struct PostResponse {
    pub status: &'static str,
    pub title: String,
}

async fn post_to_naver(
    Extension(state): Extension<Arc<AppState>>,
    Json(req): Json<PostRequest>,
) -> impl IntoResponse {
    info!("Post request received ({} body chars)", req.body.chars().count());

    match state.publisher.publish(&req.title, &req.body).await {
        Ok(title) => Json(PostResponse { status: "success", title }).into_response(),
        Err(e) => {
            error!("Publish failed: {}", e);
            err_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()).into_response()
        }
    }
}
