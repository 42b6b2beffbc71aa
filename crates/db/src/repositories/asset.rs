//! Asset and cash flow repository.

use std::sync::Arc;

use crate::entities::{Asset, CashFlow, asset, cash_flow};
use finboard_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// Repository for a user's tracked assets and recurring cash flows.
#[derive(Clone)]
pub struct AssetRepository {
    db: Arc<DatabaseConnection>,
}

impl AssetRepository {
    /// Create a new asset repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create an asset.
    pub async fn create(&self, model: asset::ActiveModel) -> AppResult<asset::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get an asset by ID.
    pub async fn get_by_id(&self, id: &str) -> AppResult<asset::Model> {
        Asset::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Asset {id} not found")))
    }

    /// Assets owned by a user.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<asset::Model>> {
        Asset::find()
            .filter(asset::Column::UserId.eq(user_id))
            .order_by_desc(asset::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete an asset.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Asset::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ========== Cash flows ==========

    /// Create a cash flow.
    pub async fn create_cash_flow(
        &self,
        model: cash_flow::ActiveModel,
    ) -> AppResult<cash_flow::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a cash flow by ID.
    pub async fn get_cash_flow(&self, id: &str) -> AppResult<cash_flow::Model> {
        CashFlow::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Cash flow {id} not found")))
    }

    /// Cash flows of a user ordered by day of month.
    pub async fn find_cash_flows_by_user(&self, user_id: &str) -> AppResult<Vec<cash_flow::Model>> {
        CashFlow::find()
            .filter(cash_flow::Column::UserId.eq(user_id))
            .order_by_asc(cash_flow::Column::DayOfMonth)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a cash flow.
    pub async fn delete_cash_flow(&self, id: &str) -> AppResult<()> {
        CashFlow::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::asset::AssetKind;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_find_by_user() {
        let asset = asset::Model {
            id: "a1".to_string(),
            user_id: "user1".to_string(),
            kind: AssetKind::RealEstate,
            name: "Apartment".to_string(),
            amount: 500_000_000,
            created_at: Utc::now().into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[asset]])
                .into_connection(),
        );

        let repo = AssetRepository::new(db);
        let assets = repo.find_by_user("user1").await.unwrap();

        assert_eq!(assets[0].kind, AssetKind::RealEstate);
    }

    #[tokio::test]
    async fn test_get_cash_flow_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<cash_flow::Model>::new()])
                .into_connection(),
        );

        let repo = AssetRepository::new(db);
        let result = repo.get_cash_flow("missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
