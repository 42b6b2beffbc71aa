//! Push subscription endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get},
};
use chrono::Utc;
use finboard_common::AppResult;
use finboard_core::RegisterSubscriptionInput;
use finboard_db::entities::push_subscription;

use crate::{
    extractors::AuthUser,
    middleware::{AppState, gated},
    response::ApiResponse,
};

async fn list(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<push_subscription::Model>>> {
    Ok(ApiResponse::ok(state.push_service.list(user.id()).await?))
}

async fn register(
    user: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<RegisterSubscriptionInput>,
) -> AppResult<ApiResponse<push_subscription::Model>> {
    let subscription = state
        .push_service
        .register(user.id(), req, Utc::now())
        .await?;
    Ok(ApiResponse::ok(subscription))
}

async fn unregister(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.push_service.unregister(user.id(), &id).await?;
    Ok(ApiResponse::empty())
}

pub fn router(state: &AppState) -> Router<AppState> {
    let routes = Router::new()
        .route("/subscriptions", get(list).post(register))
        .route("/subscriptions/{id}", delete(unregister));

    gated(state, routes)
}
