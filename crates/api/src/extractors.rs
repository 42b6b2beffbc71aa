//! Request extractors.

use axum::{extract::FromRequestParts, http::request::Parts};
use finboard_common::AppError;
use finboard_core::SessionClaims;

/// Caller with a valid session.
///
/// Carries the token snapshot only. Services re-read role and ownership.
#[derive(Debug, Clone)]
pub struct AuthUser(pub SessionClaims);

impl AuthUser {
    /// The caller's user id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.0.sub
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by auth middleware
        parts
            .extensions
            .get::<SessionClaims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AppError::Unauthorized("sign-in required".to_string()))
    }
}
