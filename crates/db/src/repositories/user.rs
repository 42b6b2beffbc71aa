//! User repository.

use std::sync::Arc;

use crate::entities::{
    Asset, CashFlow, Comment, Inquiry, InquiryAnswer, Post, PushSubscription, Report, User,
    VerificationToken, asset, cash_flow, comment, inquiry, inquiry_answer, post,
    push_subscription, report, user, verification_token,
};
use finboard_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, SqlErr, TransactionTrait,
};

/// Map an insert/update failure, surfacing unique violations as conflicts.
pub(crate) fn write_err(e: DbErr) -> AppError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => AppError::Conflict(detail),
        _ => AppError::Database(e.to_string()),
    }
}

/// User repository for database operations.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<user::Model>> {
        User::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<user::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(id.to_string()))
    }

    /// Find users by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<user::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        User::find()
            .filter(user::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by email (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Email.eq(email.to_lowercase()))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by nickname.
    pub async fn find_by_nickname(&self, nickname: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Nickname.eq(nickname))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new user.
    pub async fn create(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model.insert(self.db.as_ref()).await.map_err(write_err)
    }

    /// Create an unverified user together with its verification token.
    ///
    /// Both rows land or neither does.
    pub async fn create_with_token(
        &self,
        model: user::ActiveModel,
        token: verification_token::ActiveModel,
    ) -> AppResult<(user::Model, verification_token::Model)> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let user = model.insert(&txn).await.map_err(write_err)?;
        let token = token.insert(&txn).await.map_err(write_err)?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((user, token))
    }

    /// Update a user.
    pub async fn update(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model.update(self.db.as_ref()).await.map_err(write_err)
    }

    /// Suspended users that have submitted an appeal, most recently updated first.
    pub async fn find_suspended_with_appeal(&self) -> AppResult<Vec<user::Model>> {
        User::find()
            .filter(user::Column::Suspended.eq(true))
            .filter(user::Column::SuspendedAppeal.is_not_null())
            .order_by_desc(user::Column::UpdatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Users with a soft delete pending, oldest request first.
    pub async fn find_soft_delete_pending(&self) -> AppResult<Vec<user::Model>> {
        User::find()
            .filter(user::Column::DeletedAt.is_not_null())
            .order_by_asc(user::Column::DeletedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Users that opted into push reminders.
    pub async fn find_notification_recipients(&self) -> AppResult<Vec<user::Model>> {
        User::find()
            .filter(user::Column::NotificationsEnabled.eq(true))
            .filter(user::Column::Suspended.eq(false))
            .filter(user::Column::DeletedAt.is_null())
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Unverified user registered under the given email, if any.
    pub async fn find_unverified_by_email(&self, email: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Email.eq(email.to_lowercase()))
            .filter(user::Column::EmailVerified.is_null())
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Remove a user and everything they own in one transaction.
    ///
    /// Returns `false` when the row was already gone.
    pub async fn hard_delete(&self, id: &str) -> AppResult<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let Some(target) = User::find_by_id(id)
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        else {
            return Ok(false);
        };

        let post_ids: Vec<String> = Post::find()
            .select_only()
            .column(post::Column::Id)
            .filter(post::Column::AuthorId.eq(id))
            .into_tuple()
            .all(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let inquiry_ids: Vec<String> = Inquiry::find()
            .select_only()
            .column(inquiry::Column::Id)
            .filter(inquiry::Column::UserId.eq(id))
            .into_tuple()
            .all(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        // Children before parents
        Comment::delete_many()
            .filter(
                Condition::any()
                    .add(comment::Column::AuthorId.eq(id))
                    .add(comment::Column::PostId.is_in(post_ids)),
            )
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Post::delete_many()
            .filter(post::Column::AuthorId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        InquiryAnswer::delete_many()
            .filter(inquiry_answer::Column::InquiryId.is_in(inquiry_ids))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Inquiry::delete_many()
            .filter(inquiry::Column::UserId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Report::delete_many()
            .filter(report::Column::ReporterId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Asset::delete_many()
            .filter(asset::Column::UserId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        CashFlow::delete_many()
            .filter(cash_flow::Column::UserId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        PushSubscription::delete_many()
            .filter(push_subscription::Column::UserId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        VerificationToken::delete_many()
            .filter(verification_token::Column::Identifier.eq(target.email.clone()))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        User::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::user::UserRole;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_user(id: &str, nickname: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            email: format!("{nickname}@example.com"),
            nickname: nickname.to_string(),
            password_hash: "hash".to_string(),
            role: UserRole::User,
            email_verified: Some(Utc::now().into()),
            two_factor_enabled: false,
            notifications_enabled: false,
            suspended: false,
            suspended_reason: None,
            suspended_appeal: None,
            deleted_at: None,
            reactivated_at: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_id_found() {
        let user = create_test_user("user1", "tester");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.find_by_id("user1").await.unwrap();

        assert_eq!(result.unwrap().nickname, "tester");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found_returns_error() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.get_by_id("nonexistent").await;

        match result {
            Err(AppError::UserNotFound(id)) => assert_eq!(id, "nonexistent"),
            _ => panic!("Expected UserNotFound error"),
        }
    }

    #[tokio::test]
    async fn test_find_suspended_with_appeal() {
        let mut user = create_test_user("user1", "tester");
        user.suspended = true;
        user.suspended_reason = Some("spam".to_string());
        user.suspended_appeal = Some("it was a mistake".to_string());

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.find_suspended_with_appeal().await.unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(
            result[0].suspended_appeal.as_deref(),
            Some("it was a mistake")
        );
    }

    #[tokio::test]
    async fn test_find_by_ids_empty_skips_query() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = UserRepository::new(db);
        let result = repo.find_by_ids(&[]).await.unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_hard_delete_missing_user_is_noop() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        assert!(!repo.hard_delete("ghost").await.unwrap());
    }
}
