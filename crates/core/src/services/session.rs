//! Session token issuing and decoding.
//!
//! A session is an HS256 JWT carrying a snapshot of the lifecycle flags the
//! access gate needs. The snapshot is only as fresh as the token: new flags
//! reach the session on [`SessionIssuer::issue`] after a refresh.

use chrono::{DateTime, Duration, Utc};
use finboard_common::{AppResult, config::AuthConfig};
use finboard_db::entities::user::{self, UserRole};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Claims embedded in a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User ID.
    pub sub: String,
    /// Role at issue time.
    pub role: UserRole,
    /// Suspension flag at issue time.
    pub suspended: bool,
    /// Suspension reason at issue time.
    pub suspended_reason: Option<String>,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expires at (unix seconds).
    pub exp: i64,
}

impl SessionClaims {
    /// Build the claims for `user` as of `now`.
    #[must_use]
    pub fn for_user(user: &user::Model, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            sub: user.id.clone(),
            role: user.role,
            suspended: user.suspended,
            suspended_reason: user.suspended_reason.clone(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    /// Whether the snapshot carries the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Signs and verifies session tokens.
#[derive(Clone)]
pub struct SessionIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SessionIssuer {
    /// Create an issuer with an HMAC secret and a lifetime in days.
    #[must_use]
    pub fn new(secret: &str, ttl_days: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::days(ttl_days),
        }
    }

    /// Create an issuer from the auth configuration section.
    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.session_secret, config.session_ttl_days)
    }

    /// Session lifetime.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token snapshotting `user` as of `now`.
    pub fn issue(&self, user: &user::Model, now: DateTime<Utc>) -> AppResult<String> {
        let claims = SessionClaims::for_user(user, now, self.ttl);
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    /// Verify a token and return its claims.
    pub fn decode(&self, token: &str) -> AppResult<SessionClaims> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<SessionClaims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use finboard_common::AppError;

    fn user(suspended: bool) -> user::Model {
        user::Model {
            id: "user1".to_string(),
            email: "kim@example.com".to_string(),
            nickname: "kim".to_string(),
            password_hash: String::new(),
            role: UserRole::User,
            email_verified: Some(Utc::now().into()),
            two_factor_enabled: false,
            notifications_enabled: false,
            suspended,
            suspended_reason: suspended.then(|| "spam".to_string()),
            suspended_appeal: None,
            deleted_at: None,
            reactivated_at: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[test]
    fn test_issue_and_decode() {
        let issuer = SessionIssuer::new("secret", 30);
        let now = Utc::now();
        let token = issuer.issue(&user(true), now).unwrap();

        let claims = issuer.decode(&token).unwrap();
        assert_eq!(claims.sub, "user1");
        assert!(claims.suspended);
        assert_eq!(claims.suspended_reason.as_deref(), Some("spam"));
        assert_eq!(claims.exp - claims.iat, 30 * 24 * 60 * 60);
    }

    #[test]
    fn test_wrong_secret_is_unauthorized() {
        let token = SessionIssuer::new("secret", 30)
            .issue(&user(false), Utc::now())
            .unwrap();

        let result = SessionIssuer::new("other", 30).decode(&token);
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_expired_token_is_unauthorized() {
        let issuer = SessionIssuer::new("secret", 30);
        let token = issuer
            .issue(&user(false), Utc::now() - Duration::days(31))
            .unwrap();

        let result = issuer.decode(&token);
        assert!(matches!(result, Err(AppError::Unauthorized(m)) if m == "session expired"));
    }
}
