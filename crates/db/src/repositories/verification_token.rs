//! Email verification token repository.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    prelude::DateTimeWithTimeZone,
};

use crate::entities::{VerificationToken, verification_token};
use finboard_common::{AppError, AppResult};

/// Repository for registration verification tokens.
#[derive(Clone)]
pub struct VerificationTokenRepository {
    db: Arc<DatabaseConnection>,
}

impl VerificationTokenRepository {
    /// Create a new verification token repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Look a token up by its secret value.
    pub async fn find_by_token(&self, token: &str) -> AppResult<Option<verification_token::Model>> {
        VerificationToken::find()
            .filter(verification_token::Column::Token.eq(token))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Tokens whose expiry lies before `now`.
    pub async fn find_expired(
        &self,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<verification_token::Model>> {
        VerificationToken::find()
            .filter(verification_token::Column::Expires.lt(DateTimeWithTimeZone::from(now)))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a single token.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        VerificationToken::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
