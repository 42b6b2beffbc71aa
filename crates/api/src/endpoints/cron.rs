//! Externally triggered sweeps, authenticated with a shared bearer secret.

use axum::{Router, extract::State, http::HeaderMap, routing::get};
use chrono::Utc;
use finboard_common::{AppError, AppResult};
use finboard_core::{NotificationReport, SweepReport};
use subtle::ConstantTimeEq;

use crate::{
    middleware::{AppState, bearer_token},
    response::ApiResponse,
};

/// An empty secret never matches.
fn secret_matches(presented: Option<&str>, expected: &str) -> bool {
    let presented = presented.unwrap_or_default();
    !expected.is_empty() && bool::from(presented.as_bytes().ct_eq(expected.as_bytes()))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> AppResult<()> {
    if secret_matches(bearer_token(headers), &state.cron_secret) {
        Ok(())
    } else {
        Err(AppError::Unauthorized("invalid cron secret".to_string()))
    }
}

async fn cleanup(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<ApiResponse<SweepReport>> {
    authorize(&state, &headers)?;
    let report = state.sweeper_service.run_cleanup(Utc::now()).await?;
    Ok(ApiResponse::ok(report))
}

async fn notifications(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<ApiResponse<NotificationReport>> {
    authorize(&state, &headers)?;
    let report = state.sweeper_service.run_notifications(Utc::now()).await?;
    Ok(ApiResponse::ok(report))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cleanup", get(cleanup))
        .route("/notifications", get(notifications))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_matches() {
        assert!(secret_matches(Some("s3cret"), "s3cret"));
        assert!(!secret_matches(Some("s3cre"), "s3cret"));
        assert!(!secret_matches(Some("s3cret!"), "s3cret"));
        assert!(!secret_matches(None, "s3cret"));
    }

    #[test]
    fn test_empty_secret_never_matches() {
        assert!(!secret_matches(Some(""), ""));
        assert!(!secret_matches(None, ""));
    }
}
