//! Moderation: content reports and their admin decisions.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use finboard_common::{
    AppError, AppResult, IdGenerator,
    rules::{MAX_TEXT_CHARS, required_text},
};
use finboard_db::{
    entities::report::{self, ReportStatus, ReportTarget},
    repositories::{PostRepository, ReportRepository, UserRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::lifecycle::LifecycleService;

const MAX_SCREENSHOT_URL_LEN: usize = 1024;
const MAX_PAGE_SIZE: u64 = 100;
const PREVIEW_CHARS: usize = 80;

/// Input for filing a report.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReportInput {
    pub target: ReportTarget,
    pub reason: String,
    pub screenshot_url: Option<String>,
}

/// Minimal user reference in moderation views.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub id: String,
    pub nickname: Option<String>,
}

/// A report joined with its reporter, target and target author.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportView {
    pub id: String,
    pub reason: String,
    pub status: ReportStatus,
    pub screenshot_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub resolved_by: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub reporter: UserRef,
    pub target: ReportTarget,
    /// Whether the reported content still exists.
    pub target_exists: bool,
    /// Post title or comment text, shortened.
    pub target_preview: Option<String>,
    pub target_author: UserRef,
    /// Live suspension flag of the target author. `None` once the author is gone.
    pub target_author_suspended: Option<bool>,
}

/// Moderation service for handling reports.
#[derive(Clone)]
pub struct ModerationService {
    report_repo: ReportRepository,
    post_repo: PostRepository,
    user_repo: UserRepository,
    lifecycle: LifecycleService,
    id_gen: IdGenerator,
}

impl ModerationService {
    /// Create a new moderation service.
    #[must_use]
    pub const fn new(
        report_repo: ReportRepository,
        post_repo: PostRepository,
        user_repo: UserRepository,
        lifecycle: LifecycleService,
    ) -> Self {
        Self {
            report_repo,
            post_repo,
            user_repo,
            lifecycle,
            id_gen: IdGenerator::new(),
        }
    }

    /// File a report against a post or a comment.
    ///
    /// The target's author is captured now so the report keeps pointing at the
    /// reported user after the content is gone.
    pub async fn file_report(
        &self,
        reporter_id: &str,
        input: FileReportInput,
        now: DateTime<Utc>,
    ) -> AppResult<report::Model> {
        let reason = required_text("reason", &input.reason, MAX_TEXT_CHARS)?;

        let screenshot_url = input
            .screenshot_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());
        if screenshot_url
            .as_ref()
            .is_some_and(|url| url.len() > MAX_SCREENSHOT_URL_LEN)
        {
            return Err(AppError::validation("screenshot url too long"));
        }

        let target_author_id = match &input.target {
            ReportTarget::Post(id) => self.post_repo.get_by_id(id).await?.author_id,
            ReportTarget::Comment(id) => self.post_repo.get_comment(id).await?.author_id,
        };

        let report = self
            .report_repo
            .create(report::ActiveModel {
                id: Set(self.id_gen.generate()),
                reporter_id: Set(reporter_id.to_string()),
                target_kind: Set(input.target.kind()),
                target_id: Set(input.target.id().to_string()),
                target_author_id: Set(target_author_id),
                reason: Set(reason),
                screenshot_url: Set(screenshot_url),
                status: Set(ReportStatus::Pending),
                resolved_by: Set(None),
                resolved_at: Set(None),
                created_at: Set(now.into()),
            })
            .await?;

        info!(report_id = %report.id, reporter_id = %reporter_id, "Report filed");
        Ok(report)
    }

    /// Mark a report resolved.
    pub async fn resolve_report(
        &self,
        admin_id: &str,
        report_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<report::Model> {
        self.decide(admin_id, report_id, ReportStatus::Resolved, now)
            .await
    }

    /// Mark a report rejected.
    pub async fn reject_report(
        &self,
        admin_id: &str,
        report_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<report::Model> {
        self.decide(admin_id, report_id, ReportStatus::Rejected, now)
            .await
    }

    async fn decide(
        &self,
        admin_id: &str,
        report_id: &str,
        decision: ReportStatus,
        now: DateTime<Utc>,
    ) -> AppResult<report::Model> {
        self.lifecycle.require_admin(admin_id).await?;
        let report = self.report_repo.get_by_id(report_id).await?;

        match report.status {
            ReportStatus::Pending => {
                let updated = self
                    .report_repo
                    .set_decision(report, decision, admin_id, now)
                    .await?;
                info!(report_id = %report_id, admin_id = %admin_id, status = ?decision, "Report decided");
                Ok(updated)
            }
            // Repeating the same decision changes nothing
            current if current == decision => Ok(report),
            current => Err(AppError::Conflict(format!(
                "report already {}",
                status_label(current)
            ))),
        }
    }

    /// The moderation queue: reports joined with reporter, target and author.
    pub async fn list_reports_with_targets(
        &self,
        admin_id: &str,
        status: Option<ReportStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<ReportView>> {
        self.lifecycle.require_admin(admin_id).await?;

        let reports = self
            .report_repo
            .list(status, limit.clamp(1, MAX_PAGE_SIZE), offset)
            .await?;

        let mut post_ids = Vec::new();
        let mut comment_ids = Vec::new();
        let mut user_ids = Vec::new();
        for report in &reports {
            match report.target() {
                ReportTarget::Post(id) => post_ids.push(id),
                ReportTarget::Comment(id) => comment_ids.push(id),
            }
            user_ids.push(report.reporter_id.clone());
            user_ids.push(report.target_author_id.clone());
        }
        user_ids.sort_unstable();
        user_ids.dedup();

        let posts: HashMap<String, String> = self
            .post_repo
            .find_by_ids(&post_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p.title))
            .collect();
        let comments: HashMap<String, String> = self
            .post_repo
            .find_comments_by_ids(&comment_ids)
            .await?
            .into_iter()
            .map(|c| (c.id, c.content))
            .collect();
        let users: HashMap<String, (String, bool)> = self
            .user_repo
            .find_by_ids(&user_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, (u.nickname, u.suspended)))
            .collect();

        Ok(reports
            .into_iter()
            .map(|report| {
                let target = report.target();
                let preview = match &target {
                    ReportTarget::Post(id) => posts.get(id),
                    ReportTarget::Comment(id) => comments.get(id),
                }
                .map(String::as_str)
                .map(shorten);
                let author = users.get(&report.target_author_id);

                ReportView {
                    reporter: UserRef {
                        nickname: users.get(&report.reporter_id).map(|(n, _)| n.clone()),
                        id: report.reporter_id,
                    },
                    target_exists: preview.is_some(),
                    target_preview: preview,
                    target,
                    target_author: UserRef {
                        id: report.target_author_id,
                        nickname: author.map(|(n, _)| n.clone()),
                    },
                    target_author_suspended: author.map(|(_, s)| *s),
                    id: report.id,
                    reason: report.reason,
                    status: report.status,
                    screenshot_url: report.screenshot_url,
                    created_at: report.created_at.with_timezone(&Utc),
                    resolved_by: report.resolved_by,
                    resolved_at: report.resolved_at.map(|d| d.with_timezone(&Utc)),
                }
            })
            .collect())
    }

    /// Number of reports waiting for a decision.
    pub async fn count_pending_reports(&self, admin_id: &str) -> AppResult<u64> {
        self.lifecycle.require_admin(admin_id).await?;
        self.report_repo
            .count_by_status(ReportStatus::Pending)
            .await
    }
}

const fn status_label(status: ReportStatus) -> &'static str {
    match status {
        ReportStatus::Pending => "pending",
        ReportStatus::Resolved => "resolved",
        ReportStatus::Rejected => "rejected",
    }
}

fn shorten(text: &str) -> String {
    if text.chars().count() <= PREVIEW_CHARS {
        text.to_string()
    } else {
        let mut short: String = text.chars().take(PREVIEW_CHARS).collect();
        short.push('…');
        short
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use finboard_db::entities::{
        report::ReportTargetKind,
        user::{self, UserRole},
    };
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn admin() -> user::Model {
        user::Model {
            id: "admin".to_string(),
            email: "admin@example.com".to_string(),
            nickname: "admin".to_string(),
            password_hash: String::new(),
            role: UserRole::Admin,
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

    fn test_report(status: ReportStatus) -> report::Model {
        report::Model {
            id: "r1".to_string(),
            reporter_id: "u1".to_string(),
            target_kind: ReportTargetKind::Post,
            target_id: "p1".to_string(),
            target_author_id: "u2".to_string(),
            reason: "욕설".to_string(),
            screenshot_url: None,
            status,
            resolved_by: Some("admin".to_string()),
            resolved_at: Some(Utc::now().into()),
            created_at: Utc::now().into(),
        }
    }

    fn service(db: MockDatabase) -> ModerationService {
        let db = Arc::new(db.into_connection());
        let user_repo = UserRepository::new(Arc::clone(&db));
        ModerationService::new(
            ReportRepository::new(Arc::clone(&db)),
            PostRepository::new(db),
            user_repo.clone(),
            LifecycleService::new(user_repo),
        )
    }

    #[tokio::test]
    async fn test_resolve_twice_is_noop() {
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[admin()]])
                .append_query_results([[test_report(ReportStatus::Resolved)]]),
        );

        let report = svc.resolve_report("admin", "r1", Utc::now()).await.unwrap();
        assert_eq!(report.status, ReportStatus::Resolved);
    }

    #[tokio::test]
    async fn test_reject_after_resolve_conflicts() {
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[admin()]])
                .append_query_results([[test_report(ReportStatus::Resolved)]]),
        );

        let result = svc.reject_report("admin", "r1", Utc::now()).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_file_report_requires_reason() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres));

        let result = svc
            .file_report(
                "u1",
                FileReportInput {
                    target: ReportTarget::Post("p1".to_string()),
                    reason: "  ".to_string(),
                    screenshot_url: None,
                },
                Utc::now(),
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_shorten_preview() {
        assert_eq!(shorten("short"), "short");
        let long = "가".repeat(100);
        assert_eq!(shorten(&long).chars().count(), PREVIEW_CHARS + 1);
    }
}
