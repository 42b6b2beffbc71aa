//! Push subscription repository.

use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

use super::user::write_err;
use crate::entities::push_subscription::{ActiveModel, Column, Entity, Model};
use finboard_common::{AppError, AppResult};

/// Repository for push subscription operations.
#[derive(Clone)]
pub struct PushSubscriptionRepository {
    db: Arc<DatabaseConnection>,
}

impl PushSubscriptionRepository {
    /// Create a new push subscription repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a push subscription by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<Model>> {
        Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a push subscription by ID or return an error.
    pub async fn get_by_id(&self, id: &str) -> AppResult<Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Push subscription {id} not found")))
    }

    /// Find a push subscription by endpoint.
    pub async fn find_by_endpoint(&self, endpoint: &str) -> AppResult<Option<Model>> {
        Entity::find()
            .filter(Column::Endpoint.eq(endpoint))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find all subscriptions for a user.
    pub async fn find_by_user_id(&self, user_id: &str) -> AppResult<Vec<Model>> {
        Entity::find()
            .filter(Column::UserId.eq(user_id))
            .order_by_desc(Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new push subscription.
    pub async fn create(&self, subscription: ActiveModel) -> AppResult<Model> {
        subscription
            .insert(self.db.as_ref())
            .await
            .map_err(write_err)
    }

    /// Update an existing subscription.
    pub async fn update(&self, subscription: ActiveModel) -> AppResult<Model> {
        subscription
            .update(self.db.as_ref())
            .await
            .map_err(write_err)
    }

    /// Delete a subscription by ID.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete every subscription whose endpoint is in `endpoints`.
    ///
    /// Returns the number of rows removed.
    pub async fn delete_by_endpoints(&self, endpoints: &[String]) -> AppResult<u64> {
        if endpoints.is_empty() {
            return Ok(0);
        }

        let result = Entity::delete_many()
            .filter(Column::Endpoint.is_in(endpoints.to_vec()))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }
}
