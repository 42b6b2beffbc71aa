//! Report filing.

use axum::{Json, Router, extract::State, routing::post};
use chrono::Utc;
use finboard_common::AppResult;
use finboard_core::FileReportInput;
use finboard_db::entities::report;

use crate::{
    extractors::AuthUser,
    middleware::{AppState, gated},
    response::ApiResponse,
};

/// Report a post or a comment.
async fn file_report(
    user: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FileReportInput>,
) -> AppResult<ApiResponse<report::Model>> {
    let report = state
        .moderation_service
        .file_report(user.id(), req, Utc::now())
        .await?;
    Ok(ApiResponse::ok(report))
}

pub fn router(state: &AppState) -> Router<AppState> {
    gated(state, Router::new().route("/reports", post(file_report)))
}
