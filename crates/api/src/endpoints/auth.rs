//! Registration, email verification and session endpoints.

use axum::{Json, Router, extract::State, routing::post};
use chrono::Utc;
use finboard_common::AppResult;
use finboard_core::{AccountView, RegisterInput, SignedIn};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Registration response. The verification token goes out by mail, never here.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredResponse {
    pub user_id: String,
    pub email: String,
}

/// Email verification request.
#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    pub token: String,
}

/// Sign-in request.
#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Create an unverified account.
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterInput>,
) -> AppResult<ApiResponse<RegisteredResponse>> {
    let registration = state.auth_service.register(req, Utc::now()).await?;

    Ok(ApiResponse::ok(RegisteredResponse {
        user_id: registration.user.id,
        email: registration.user.email,
    }))
}

/// Confirm an email address.
async fn verify_email(
    State(state): State<AppState>,
    Json(req): Json<VerifyEmailRequest>,
) -> AppResult<ApiResponse<AccountView>> {
    let user = state.auth_service.verify_email(&req.token, Utc::now()).await?;
    Ok(ApiResponse::ok(user.into()))
}

/// Sign in and receive a session token.
async fn sign_in(
    State(state): State<AppState>,
    Json(req): Json<SignInRequest>,
) -> AppResult<ApiResponse<SignedIn>> {
    let signed_in = state
        .auth_service
        .sign_in(&req.email, &req.password, Utc::now())
        .await?;
    Ok(ApiResponse::ok(signed_in))
}

/// Re-issue the session from the current user row.
async fn refresh(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<SignedIn>> {
    let signed_in = state.auth_service.refresh(user.id(), Utc::now()).await?;
    Ok(ApiResponse::ok(signed_in))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/verify-email", post(verify_email))
        .route("/sign-in", post(sign_in))
        .route("/refresh", post(refresh))
}
