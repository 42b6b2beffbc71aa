//! Report repository.

use std::sync::Arc;

use crate::entities::{
    Report,
    report::{self, ReportStatus},
};
use chrono::{DateTime, Utc};
use finboard_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

/// Report repository for database operations.
#[derive(Clone)]
pub struct ReportRepository {
    db: Arc<DatabaseConnection>,
}

impl ReportRepository {
    /// Create a new report repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a new report.
    pub async fn create(&self, model: report::ActiveModel) -> AppResult<report::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a report by ID.
    pub async fn get_by_id(&self, id: &str) -> AppResult<report::Model> {
        Report::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Report {id} not found")))
    }

    /// List reports, newest first, optionally filtered by status.
    pub async fn list(
        &self,
        status: Option<ReportStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<report::Model>> {
        let mut query = Report::find();

        if let Some(status) = status {
            query = query.filter(report::Column::Status.eq(status));
        }

        query
            .order_by_desc(report::Column::CreatedAt)
            .order_by_desc(report::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count reports holding `status`.
    pub async fn count_by_status(&self, status: ReportStatus) -> AppResult<u64> {
        Report::find()
            .filter(report::Column::Status.eq(status))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Record an admin decision on a report.
    pub async fn set_decision(
        &self,
        report: report::Model,
        status: ReportStatus,
        admin_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<report::Model> {
        let mut active: report::ActiveModel = report.into();
        active.status = Set(status);
        active.resolved_by = Set(Some(admin_id.to_string()));
        active.resolved_at = Set(Some(now.into()));

        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::report::ReportTargetKind;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_report(id: &str, status: ReportStatus) -> report::Model {
        report::Model {
            id: id.to_string(),
            reporter_id: "reporter".to_string(),
            target_kind: ReportTargetKind::Post,
            target_id: "post1".to_string(),
            target_author_id: "author".to_string(),
            reason: "spam".to_string(),
            screenshot_url: None,
            status,
            resolved_by: None,
            resolved_at: None,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<report::Model>::new()])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_set_decision_records_admin() {
        let report = create_test_report("r1", ReportStatus::Pending);
        let mut resolved = report.clone();
        resolved.status = ReportStatus::Resolved;
        resolved.resolved_by = Some("admin".to_string());
        resolved.resolved_at = Some(Utc::now().into());

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[resolved]])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        let updated = repo
            .set_decision(report, ReportStatus::Resolved, "admin", Utc::now())
            .await
            .unwrap();

        assert_eq!(updated.status, ReportStatus::Resolved);
        assert_eq!(updated.resolved_by.as_deref(), Some("admin"));
    }

    #[tokio::test]
    async fn test_list_pending() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    create_test_report("r2", ReportStatus::Pending),
                    create_test_report("r1", ReportStatus::Pending),
                ]])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        let reports = repo.list(Some(ReportStatus::Pending), 20, 0).await.unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].id, "r2");
    }
}
