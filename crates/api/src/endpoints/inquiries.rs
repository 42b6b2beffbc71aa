//! Inquiry desk, user side. Reachable while suspended.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use chrono::Utc;
use finboard_common::AppResult;
use finboard_core::InquiryDetail;
use finboard_db::entities::inquiry;
use serde::Deserialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Create inquiry request.
#[derive(Debug, Deserialize)]
pub struct CreateInquiryRequest {
    pub title: String,
    pub content: String,
}

async fn list_own(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<inquiry::Model>>> {
    Ok(ApiResponse::ok(
        state.inquiry_service.list_own_inquiries(user.id()).await?,
    ))
}

async fn create(
    user: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateInquiryRequest>,
) -> AppResult<ApiResponse<inquiry::Model>> {
    let inquiry = state
        .inquiry_service
        .create_inquiry(user.id(), &req.title, &req.content, Utc::now())
        .await?;
    Ok(ApiResponse::ok(inquiry))
}

async fn show(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<InquiryDetail>> {
    Ok(ApiResponse::ok(
        state.inquiry_service.get_inquiry(user.id(), &id).await?,
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/inquiries", get(list_own).post(create))
        .route("/inquiries/{id}", get(show))
}
