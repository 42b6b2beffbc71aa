//! Community board endpoints. Reading needs a session, writing passes the gate.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post},
};
use chrono::Utc;
use finboard_common::AppResult;
use finboard_core::PostDetail;
use finboard_db::entities::{comment, post};
use serde::Deserialize;

use crate::{
    extractors::AuthUser,
    middleware::{AppState, gated},
    response::ApiResponse,
};

/// Pagination query.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

const fn default_limit() -> u64 {
    20
}

/// Create post request.
#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
}

/// Create comment request.
#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
}

async fn list_posts(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<post::Model>>> {
    Ok(ApiResponse::ok(
        state.board_service.list_posts(page.limit, page.offset).await?,
    ))
}

async fn show_post(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<PostDetail>> {
    Ok(ApiResponse::ok(state.board_service.get_post(&id).await?))
}

async fn create_post(
    user: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreatePostRequest>,
) -> AppResult<ApiResponse<post::Model>> {
    let post = state
        .board_service
        .create_post(user.id(), &req.title, &req.content, Utc::now())
        .await?;
    Ok(ApiResponse::ok(post))
}

async fn delete_post(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.board_service.delete_post(user.id(), &id).await?;
    Ok(ApiResponse::empty())
}

async fn create_comment(
    user: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Json(req): Json<CreateCommentRequest>,
) -> AppResult<ApiResponse<comment::Model>> {
    let comment = state
        .board_service
        .create_comment(user.id(), &post_id, &req.content, Utc::now())
        .await?;
    Ok(ApiResponse::ok(comment))
}

async fn delete_comment(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.board_service.delete_comment(user.id(), &id).await?;
    Ok(ApiResponse::empty())
}

pub fn router(state: &AppState) -> Router<AppState> {
    let read = Router::new()
        .route("/posts", get(list_posts))
        .route("/posts/{id}", get(show_post));

    let write = Router::new()
        .route("/posts", post(create_post))
        .route("/posts/{id}", delete(delete_post))
        .route("/posts/{id}/comments", post(create_comment))
        .route("/comments/{id}", delete(delete_comment));

    read.merge(gated(state, write))
}
