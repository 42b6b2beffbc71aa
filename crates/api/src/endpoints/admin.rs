//! Admin endpoints: suspensions, account removal, the report queue and the inquiry desk.
//!
//! Handlers pass the caller through; the services re-read the admin role.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use chrono::Utc;
use finboard_common::AppResult;
use finboard_core::{AccountView, AppealEntry, InquiryDetail, InquiryStats, ReportView};
use finboard_db::entities::{
    inquiry::{self, InquiryStatus},
    report::{self, ReportStatus},
};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::AuthUser,
    middleware::{AppState, gated},
    response::ApiResponse,
};

/// Suspend user request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuspendUserRequest {
    pub user_id: String,
    pub reason: String,
}

/// Request naming a single user.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdRequest {
    pub user_id: String,
}

/// Report queue query.
#[derive(Debug, Deserialize)]
pub struct ListReportsQuery {
    #[serde(default)]
    pub status: Option<ReportStatus>,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

const fn default_limit() -> u64 {
    20
}

/// Request naming a single report.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportIdRequest {
    pub report_id: String,
}

/// Queue badge response.
#[derive(Serialize)]
pub struct PendingCountResponse {
    pub pending: u64,
}

/// Inquiry list query.
#[derive(Debug, Deserialize)]
pub struct ListInquiriesQuery {
    #[serde(default)]
    pub status: Option<InquiryStatus>,
}

/// Answer inquiry request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerInquiryRequest {
    pub inquiry_id: String,
    pub content: String,
}

// ==================== Users ====================

async fn suspend_user(
    admin: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<SuspendUserRequest>,
) -> AppResult<ApiResponse<AccountView>> {
    let user = state
        .lifecycle_service
        .suspend(admin.id(), &req.user_id, &req.reason, Utc::now())
        .await?;
    state.suspension_cache.invalidate(&req.user_id).await;
    Ok(ApiResponse::ok(user.into()))
}

async fn unsuspend_user(
    admin: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UserIdRequest>,
) -> AppResult<ApiResponse<AccountView>> {
    let user = state
        .lifecycle_service
        .unsuspend(admin.id(), &req.user_id, Utc::now())
        .await?;
    state.suspension_cache.invalidate(&req.user_id).await;
    Ok(ApiResponse::ok(user.into()))
}

async fn delete_user(
    admin: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UserIdRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .lifecycle_service
        .admin_delete_user(admin.id(), &req.user_id)
        .await?;
    state.suspension_cache.invalidate(&req.user_id).await;
    Ok(ApiResponse::empty())
}

async fn list_appeals(
    admin: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<AppealEntry>>> {
    let appeals = state
        .lifecycle_service
        .list_suspended_appeals(admin.id())
        .await?;
    Ok(ApiResponse::ok(appeals))
}

// ==================== Reports ====================

async fn list_reports(
    admin: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListReportsQuery>,
) -> AppResult<ApiResponse<Vec<ReportView>>> {
    let reports = state
        .moderation_service
        .list_reports_with_targets(admin.id(), query.status, query.limit, query.offset)
        .await?;
    Ok(ApiResponse::ok(reports))
}

async fn pending_report_count(
    admin: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<PendingCountResponse>> {
    let pending = state
        .moderation_service
        .count_pending_reports(admin.id())
        .await?;
    Ok(ApiResponse::ok(PendingCountResponse { pending }))
}

async fn resolve_report(
    admin: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ReportIdRequest>,
) -> AppResult<ApiResponse<report::Model>> {
    let report = state
        .moderation_service
        .resolve_report(admin.id(), &req.report_id, Utc::now())
        .await?;
    Ok(ApiResponse::ok(report))
}

async fn reject_report(
    admin: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ReportIdRequest>,
) -> AppResult<ApiResponse<report::Model>> {
    let report = state
        .moderation_service
        .reject_report(admin.id(), &req.report_id, Utc::now())
        .await?;
    Ok(ApiResponse::ok(report))
}

// ==================== Inquiries ====================

async fn list_inquiries(
    admin: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListInquiriesQuery>,
) -> AppResult<ApiResponse<Vec<inquiry::Model>>> {
    let inquiries = state
        .inquiry_service
        .list_all_inquiries(admin.id(), query.status)
        .await?;
    Ok(ApiResponse::ok(inquiries))
}

async fn answer_inquiry(
    admin: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<AnswerInquiryRequest>,
) -> AppResult<ApiResponse<InquiryDetail>> {
    let detail = state
        .inquiry_service
        .answer_inquiry(admin.id(), &req.inquiry_id, &req.content, Utc::now())
        .await?;
    Ok(ApiResponse::ok(detail))
}

async fn inquiry_stats(
    admin: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<InquiryStats>> {
    Ok(ApiResponse::ok(
        state.inquiry_service.inquiry_stats(admin.id()).await?,
    ))
}

pub fn router(state: &AppState) -> Router<AppState> {
    let routes = Router::new()
        // Users
        .route("/users/suspend", post(suspend_user))
        .route("/users/unsuspend", post(unsuspend_user))
        .route("/users/delete", post(delete_user))
        .route("/appeals", get(list_appeals))
        // Reports
        .route("/reports", get(list_reports))
        .route("/reports/pending-count", get(pending_report_count))
        .route("/reports/resolve", post(resolve_report))
        .route("/reports/reject", post(reject_report))
        // Inquiries
        .route("/inquiries", get(list_inquiries))
        .route("/inquiries/answer", post(answer_inquiry))
        .route("/inquiries/stats", get(inquiry_stats));

    gated(state, routes)
}
