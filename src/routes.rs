use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{agent, mint, nft, upload};
use crate::models::error::MessageResponse;
use crate::AppState;

const POST_ONLY: &str = "Method Not Allowed. This endpoint only supports POST requests.";

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(banner))
        .route("/health", get(health))
        .route("/agent", post(agent::generate_brand).fallback(method_not_allowed))
        .route("/upload-image", post(upload::upload_image).fallback(method_not_allowed))
        .route("/upload-metadata", post(upload::upload_metadata).fallback(method_not_allowed))
        .route("/upload-pdf", post(upload::upload_pdf).fallback(method_not_allowed))
        .route("/mint", post(mint::mint_ip_asset).fallback(method_not_allowed))
        .route("/user-nft", get(nft::get_user_nfts))
        .route("/marketplace", get(nft::get_marketplace))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn banner() -> &'static str {
    "Hello from Jumapel Backend!"
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn method_not_allowed() -> (StatusCode, Json<MessageResponse>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(MessageResponse {
            message: POST_ONLY.to_string(),
        }),
    )
}
