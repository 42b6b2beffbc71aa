//! Tracked assets and recurring cash flows.

use chrono::{DateTime, Utc};
use finboard_common::{
    AppError, AppResult, IdGenerator,
    rules::{MAX_TITLE_CHARS, required_text},
};
use finboard_db::{
    entities::{
        asset::{self, AssetKind},
        cash_flow,
    },
    repositories::AssetRepository,
};
use sea_orm::Set;
use serde::Deserialize;

/// Input for adding an asset.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAssetInput {
    pub kind: AssetKind,
    pub name: String,
    pub amount: i64,
}

/// Input for adding a recurring cash flow.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCashFlowInput {
    pub title: String,
    pub amount: i64,
    pub day_of_month: i32,
}

/// Asset service.
#[derive(Clone)]
pub struct AssetService {
    asset_repo: AssetRepository,
    id_gen: IdGenerator,
}

impl AssetService {
    /// Create a new asset service.
    #[must_use]
    pub const fn new(asset_repo: AssetRepository) -> Self {
        Self {
            asset_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Add an asset.
    pub async fn create_asset(
        &self,
        caller_id: &str,
        input: CreateAssetInput,
        now: DateTime<Utc>,
    ) -> AppResult<asset::Model> {
        let name = required_text("name", &input.name, MAX_TITLE_CHARS)?;
        if input.amount < 0 {
            return Err(AppError::validation("amount must not be negative"));
        }

        self.asset_repo
            .create(asset::ActiveModel {
                id: Set(self.id_gen.generate()),
                user_id: Set(caller_id.to_string()),
                kind: Set(input.kind),
                name: Set(name),
                amount: Set(input.amount),
                created_at: Set(now.into()),
            })
            .await
    }

    /// The caller's assets.
    pub async fn list_assets(&self, caller_id: &str) -> AppResult<Vec<asset::Model>> {
        self.asset_repo.find_by_user(caller_id).await
    }

    /// Delete one of the caller's assets.
    pub async fn delete_asset(&self, caller_id: &str, id: &str) -> AppResult<()> {
        let asset = self.asset_repo.get_by_id(id).await?;
        if asset.user_id != caller_id {
            return Err(AppError::permission_denied("not your asset"));
        }
        self.asset_repo.delete(id).await
    }

    /// Add a recurring cash flow.
    pub async fn create_cash_flow(
        &self,
        caller_id: &str,
        input: CreateCashFlowInput,
        now: DateTime<Utc>,
    ) -> AppResult<cash_flow::Model> {
        let title = required_text("title", &input.title, MAX_TITLE_CHARS)?;
        if !(1..=31).contains(&input.day_of_month) {
            return Err(AppError::validation("dayOfMonth must be between 1 and 31"));
        }

        self.asset_repo
            .create_cash_flow(cash_flow::ActiveModel {
                id: Set(self.id_gen.generate()),
                user_id: Set(caller_id.to_string()),
                title: Set(title),
                amount: Set(input.amount),
                day_of_month: Set(input.day_of_month),
                created_at: Set(now.into()),
            })
            .await
    }

    /// The caller's cash flows.
    pub async fn list_cash_flows(&self, caller_id: &str) -> AppResult<Vec<cash_flow::Model>> {
        self.asset_repo.find_cash_flows_by_user(caller_id).await
    }

    /// Delete one of the caller's cash flows.
    pub async fn delete_cash_flow(&self, caller_id: &str, id: &str) -> AppResult<()> {
        let flow = self.asset_repo.get_cash_flow(id).await?;
        if flow.user_id != caller_id {
            return Err(AppError::permission_denied("not your cash flow"));
        }
        self.asset_repo.delete_cash_flow(id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn service(db: MockDatabase) -> AssetService {
        AssetService::new(AssetRepository::new(Arc::new(db.into_connection())))
    }

    #[tokio::test]
    async fn test_cash_flow_day_out_of_range() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres));
        let result = svc
            .create_cash_flow(
                "u1",
                CreateCashFlowInput {
                    title: "Rent".to_string(),
                    amount: -800_000,
                    day_of_month: 32,
                },
                Utc::now(),
            )
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_foreign_asset_is_denied() {
        let asset = asset::Model {
            id: "a1".to_string(),
            user_id: "owner".to_string(),
            kind: AssetKind::Deposit,
            name: "Savings".to_string(),
            amount: 1_000,
            created_at: Utc::now().into(),
        };
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[asset]]));

        let result = svc.delete_asset("intruder", "a1").await;
        assert!(matches!(result, Err(AppError::PermissionDenied(_))));
    }
}
