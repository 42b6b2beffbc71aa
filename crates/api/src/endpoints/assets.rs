//! Asset and cash-flow endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get},
};
use chrono::Utc;
use finboard_common::AppResult;
use finboard_core::{CreateAssetInput, CreateCashFlowInput};
use finboard_db::entities::{asset, cash_flow};

use crate::{
    extractors::AuthUser,
    middleware::{AppState, gated},
    response::ApiResponse,
};

async fn list_assets(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<asset::Model>>> {
    Ok(ApiResponse::ok(
        state.asset_service.list_assets(user.id()).await?,
    ))
}

async fn create_asset(
    user: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateAssetInput>,
) -> AppResult<ApiResponse<asset::Model>> {
    let asset = state
        .asset_service
        .create_asset(user.id(), req, Utc::now())
        .await?;
    Ok(ApiResponse::ok(asset))
}

async fn delete_asset(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.asset_service.delete_asset(user.id(), &id).await?;
    Ok(ApiResponse::empty())
}

async fn list_cash_flows(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<cash_flow::Model>>> {
    Ok(ApiResponse::ok(
        state.asset_service.list_cash_flows(user.id()).await?,
    ))
}

async fn create_cash_flow(
    user: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateCashFlowInput>,
) -> AppResult<ApiResponse<cash_flow::Model>> {
    let flow = state
        .asset_service
        .create_cash_flow(user.id(), req, Utc::now())
        .await?;
    Ok(ApiResponse::ok(flow))
}

async fn delete_cash_flow(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.asset_service.delete_cash_flow(user.id(), &id).await?;
    Ok(ApiResponse::empty())
}

pub fn router(state: &AppState) -> Router<AppState> {
    let routes = Router::new()
        .route("/assets", get(list_assets).post(create_asset))
        .route("/assets/{id}", delete(delete_asset))
        .route("/cash-flows", get(list_cash_flows).post(create_cash_flow))
        .route("/cash-flows/{id}", delete(delete_cash_flow));

    gated(state, routes)
}
