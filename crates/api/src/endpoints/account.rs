//! Self-service account endpoints: profile, appeal, deletion and preferences.
//!
//! Everything except the nickname and notification settings stays reachable
//! while the account is suspended.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use chrono::Utc;
use finboard_common::AppResult;
use finboard_core::AccountView;
use serde::Deserialize;

use crate::{
    extractors::AuthUser,
    middleware::{AppState, gated},
    response::ApiResponse,
};

/// Nickname change request.
#[derive(Debug, Deserialize)]
pub struct NicknameRequest {
    pub nickname: String,
}

/// Appeal request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppealRequest {
    /// Defaults to the caller.
    #[serde(default)]
    pub user_id: Option<String>,
    pub appeal: String,
}

/// Notification preference request.
#[derive(Debug, Deserialize)]
pub struct NotificationsRequest {
    pub enabled: bool,
}

async fn me(user: AuthUser, State(state): State<AppState>) -> AppResult<ApiResponse<AccountView>> {
    Ok(ApiResponse::ok(state.lifecycle_service.me(user.id()).await?))
}

async fn change_nickname(
    user: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<NicknameRequest>,
) -> AppResult<ApiResponse<AccountView>> {
    let updated = state
        .auth_service
        .change_nickname(user.id(), &req.nickname, Utc::now())
        .await?;
    Ok(ApiResponse::ok(updated.into()))
}

async fn file_appeal(
    user: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<AppealRequest>,
) -> AppResult<ApiResponse<AccountView>> {
    let target = req.user_id.as_deref().unwrap_or(user.id());
    let updated = state
        .lifecycle_service
        .file_appeal(user.id(), target, &req.appeal, Utc::now())
        .await?;
    Ok(ApiResponse::ok(updated.into()))
}

async fn request_deletion(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<AccountView>> {
    let updated = state
        .lifecycle_service
        .request_soft_delete(user.id(), Utc::now())
        .await?;
    Ok(ApiResponse::ok(updated.into()))
}

async fn cancel_deletion(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<AccountView>> {
    let updated = state
        .lifecycle_service
        .cancel_soft_delete(user.id(), Utc::now())
        .await?;
    Ok(ApiResponse::ok(updated.into()))
}

async fn clear_reactivation_notice(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<AccountView>> {
    let updated = state
        .lifecycle_service
        .clear_reactivation_notice(user.id())
        .await?;
    Ok(ApiResponse::ok(updated.into()))
}

async fn set_notifications(
    user: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<NotificationsRequest>,
) -> AppResult<ApiResponse<AccountView>> {
    let updated = state
        .lifecycle_service
        .set_notifications(user.id(), req.enabled, Utc::now())
        .await?;
    Ok(ApiResponse::ok(updated.into()))
}

pub fn router(state: &AppState) -> Router<AppState> {
    let open = Router::new()
        .route("/me", get(me))
        .route("/appeal", post(file_appeal))
        .route("/delete", post(request_deletion))
        .route("/delete/cancel", post(cancel_deletion))
        .route("/reactivation-notice/clear", post(clear_reactivation_notice));

    let member = Router::new()
        .route("/nickname", post(change_nickname))
        .route("/notifications", post(set_notifications));

    open.merge(gated(state, member))
}
