//! API endpoints.

mod account;
mod admin;
mod assets;
mod auth;
mod board;
mod cron;
mod inquiries;
mod push;
mod reports;

use axum::{Json, Router, routing::get};
use serde_json::{Value, json};

use crate::middleware::AppState;

async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

/// Create the API router.
///
/// Expects [`crate::middleware::auth_middleware`] to be layered around it so
/// session claims are in place before the suspension gate runs.
pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/auth", auth::router())
        .nest("/account", account::router(state))
        .nest("/admin", admin::router(state))
        .nest("/cron", cron::router())
        .nest("/push", push::router(state))
        .merge(reports::router(state))
        .merge(inquiries::router())
        .merge(board::router(state))
        .merge(assets::router(state))
}
