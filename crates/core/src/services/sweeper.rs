//! Out-of-band sweeps: expired registrations, lapsed soft deletes and cash-flow reminders.
//!
//! Deadlines are evaluated against the `now` passed in, never against a timer held in
//! memory, so a restart between runs loses nothing.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use finboard_common::AppResult;
use finboard_db::{
    entities::{cash_flow, verification_token},
    repositories::{
        AssetRepository, PushSubscriptionRepository, UserRepository, VerificationTokenRepository,
    },
};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::{
    lifecycle::{LifecycleService, is_grace_expired},
    push::{PushMessage, PushOutcome, PushSender},
};

/// How far ahead an upcoming reminder looks.
pub const UPCOMING_DAYS: u64 = 7;

/// Counts from one cleanup run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    /// Unverified registrations removed with their token.
    pub unverified_removed: u64,
    /// Expired tokens removed whose owner had already verified or vanished.
    pub tokens_removed: u64,
    /// Accounts hard-deleted after their grace window ran out.
    pub accounts_deleted: u64,
}

/// Counts from one notification run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationReport {
    pub sent: u64,
    pub failed: u64,
    pub expired_removed: u64,
    /// Push is not configured.
    pub skipped: bool,
}

/// When a reminder falls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DueWhen {
    Today,
    Upcoming,
}

/// A cash flow falling today or in [`UPCOMING_DAYS`] days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DueEvent {
    pub cash_flow_id: String,
    pub title: String,
    pub amount: i64,
    pub when: DueWhen,
    pub date: NaiveDate,
}

impl DueEvent {
    fn message(&self) -> PushMessage {
        let title = match self.when {
            DueWhen::Today => format!("Due today: {}", self.title),
            DueWhen::Upcoming => format!("Due in {UPCOMING_DAYS} days: {}", self.title),
        };
        PushMessage {
            title,
            body: format!("{} on {}", self.amount, self.date),
            url: "/cash-flows".to_string(),
        }
    }
}

fn days_in_month(date: NaiveDate) -> u32 {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };

    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.pred_opt())
        .map_or(31, |last| last.day())
}

/// A day past the end of the month falls on its last day.
fn falls_on(day_of_month: i32, date: NaiveDate) -> bool {
    let Ok(day_of_month) = u32::try_from(day_of_month) else {
        return false;
    };
    let last = days_in_month(date);

    day_of_month == date.day() || (day_of_month > last && date.day() == last)
}

/// Cash flows due `today` or [`UPCOMING_DAYS`] days from it.
#[must_use]
pub fn due_cash_flow_events(flows: &[cash_flow::Model], today: NaiveDate) -> Vec<DueEvent> {
    let upcoming = today.checked_add_days(Days::new(UPCOMING_DAYS));
    let mut events = Vec::new();

    for flow in flows {
        let hits = [(DueWhen::Today, Some(today)), (DueWhen::Upcoming, upcoming)];
        for (when, date) in hits {
            let Some(date) = date else { continue };
            if falls_on(flow.day_of_month, date) {
                events.push(DueEvent {
                    cash_flow_id: flow.id.clone(),
                    title: flow.title.clone(),
                    amount: flow.amount,
                    when,
                    date,
                });
            }
        }
    }

    events
}

/// Sweeper service.
#[derive(Clone)]
pub struct SweeperService {
    user_repo: UserRepository,
    token_repo: VerificationTokenRepository,
    subscription_repo: PushSubscriptionRepository,
    asset_repo: AssetRepository,
    lifecycle: LifecycleService,
    sender: Option<Arc<dyn PushSender>>,
}

impl SweeperService {
    /// Create a new sweeper. Without a sender the notification run is skipped.
    #[must_use]
    pub fn new(
        user_repo: UserRepository,
        token_repo: VerificationTokenRepository,
        subscription_repo: PushSubscriptionRepository,
        asset_repo: AssetRepository,
        lifecycle: LifecycleService,
        sender: Option<Arc<dyn PushSender>>,
    ) -> Self {
        Self {
            user_repo,
            token_repo,
            subscription_repo,
            asset_repo,
            lifecycle,
            sender,
        }
    }

    /// Remove unverified users whose verification token has expired.
    ///
    /// Returns the number of removed users.
    pub async fn cleanup_unverified(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let (users, _) = self.purge_expired_registrations(now).await?;
        Ok(users)
    }

    async fn purge_expired_registrations(&self, now: DateTime<Utc>) -> AppResult<(u64, u64)> {
        let mut users_removed = 0;
        let mut tokens_removed = 0;

        for token in self.token_repo.find_expired(now).await? {
            match self.purge_registration(&token).await {
                Ok(true) => users_removed += 1,
                Ok(false) => tokens_removed += 1,
                Err(e) => {
                    warn!(token_id = %token.id, error = %e, "Failed to purge expired registration");
                }
            }
        }

        Ok((users_removed, tokens_removed))
    }

    /// Returns `true` when an unverified user was removed, `false` when only the
    /// orphaned token was.
    async fn purge_registration(&self, token: &verification_token::Model) -> AppResult<bool> {
        if let Some(user) = self.user_repo.find_unverified_by_email(&token.identifier).await? {
            // Takes the user's tokens with it.
            if self.lifecycle.hard_delete(&user.id).await? {
                return Ok(true);
            }
        }
        self.token_repo.delete(&token.id).await?;
        Ok(false)
    }

    /// Hard-delete every account whose grace window has run out.
    ///
    /// Returns the number of deleted accounts. An account that fails to delete is
    /// logged and retried on the next run.
    pub async fn sweep_soft_deletions(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut deleted = 0;

        for user in self.user_repo.find_soft_delete_pending().await? {
            let Some(deleted_at) = user.deleted_at else {
                continue;
            };
            if !is_grace_expired(deleted_at.with_timezone(&Utc), now) {
                continue;
            }
            match self.lifecycle.hard_delete(&user.id).await {
                Ok(true) => deleted += 1,
                Ok(false) => {}
                Err(e) => warn!(user_id = %user.id, error = %e, "Failed to complete soft delete"),
            }
        }

        Ok(deleted)
    }

    /// Both cleanup sweeps. Each runs even when the other fails.
    pub async fn run_cleanup(&self, now: DateTime<Utc>) -> AppResult<SweepReport> {
        let registrations = self.purge_expired_registrations(now).await;
        let soft_deletions = self.sweep_soft_deletions(now).await;

        let (unverified_removed, tokens_removed) = registrations?;
        let accounts_deleted = soft_deletions?;

        let report = SweepReport {
            unverified_removed,
            tokens_removed,
            accounts_deleted,
        };
        info!(?report, "Cleanup sweep finished");
        Ok(report)
    }

    /// Push today's and upcoming cash-flow reminders.
    ///
    /// Subscriptions the push service reports as gone are removed in one batch
    /// once every user has been visited.
    pub async fn run_notifications(&self, now: DateTime<Utc>) -> AppResult<NotificationReport> {
        let Some(sender) = &self.sender else {
            debug!("Push is not configured, skipping notification sweep");
            return Ok(NotificationReport {
                skipped: true,
                ..NotificationReport::default()
            });
        };

        let today = now.date_naive();
        let mut report = NotificationReport::default();
        let mut expired: Vec<String> = Vec::new();

        for user in self.user_repo.find_notification_recipients().await? {
            if let Err(e) = self
                .notify_user(sender.as_ref(), &user.id, today, &mut report, &mut expired)
                .await
            {
                warn!(user_id = %user.id, error = %e, "Skipping user in notification sweep");
            }
        }

        expired.sort();
        expired.dedup();
        if !expired.is_empty() {
            report.expired_removed = self.subscription_repo.delete_by_endpoints(&expired).await?;
        }

        info!(?report, "Notification sweep finished");
        Ok(report)
    }

    async fn notify_user(
        &self,
        sender: &dyn PushSender,
        user_id: &str,
        today: NaiveDate,
        report: &mut NotificationReport,
        expired: &mut Vec<String>,
    ) -> AppResult<()> {
        let flows = self.asset_repo.find_cash_flows_by_user(user_id).await?;
        let events = due_cash_flow_events(&flows, today);
        if events.is_empty() {
            return Ok(());
        }

        let subscriptions = self.subscription_repo.find_by_user_id(user_id).await?;
        for event in &events {
            let message = event.message();
            for subscription in &subscriptions {
                match sender.send(subscription, &message).await {
                    PushOutcome::Delivered => report.sent += 1,
                    PushOutcome::Expired => {
                        report.failed += 1;
                        expired.push(subscription.endpoint.clone());
                    }
                    PushOutcome::Failed(reason) => {
                        report.failed += 1;
                        warn!(%user_id, %reason, "Push delivery failed");
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use finboard_db::entities::{push_subscription, user};
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult};

    fn flow(id: &str, day_of_month: i32) -> cash_flow::Model {
        cash_flow::Model {
            id: id.to_string(),
            user_id: "u1".to_string(),
            title: format!("flow {id}"),
            amount: 100,
            day_of_month,
            created_at: Utc::now().into(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(date(2024, 2, 10)), 29);
        assert_eq!(days_in_month(date(2025, 2, 10)), 28);
        assert_eq!(days_in_month(date(2025, 12, 1)), 31);
        assert_eq!(days_in_month(date(2025, 4, 30)), 30);
    }

    #[test]
    fn test_due_today_and_upcoming() {
        let flows = vec![flow("a", 15), flow("b", 22), flow("c", 3)];
        let events = due_cash_flow_events(&flows, date(2025, 6, 15));

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].cash_flow_id, "a");
        assert_eq!(events[0].when, DueWhen::Today);
        assert_eq!(events[1].cash_flow_id, "b");
        assert_eq!(events[1].when, DueWhen::Upcoming);
        assert_eq!(events[1].date, date(2025, 6, 22));
    }

    #[test]
    fn test_day_past_month_end_falls_on_last_day() {
        let flows = vec![flow("rent", 31)];

        let events = due_cash_flow_events(&flows, date(2025, 2, 28));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].when, DueWhen::Today);

        // 2025-04-23 + 7 = 2025-04-30, the last day of April.
        let events = due_cash_flow_events(&flows, date(2025, 4, 23));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].when, DueWhen::Upcoming);

        assert!(due_cash_flow_events(&flows, date(2025, 2, 27)).is_empty());
    }

    #[test]
    fn test_upcoming_crosses_month_boundary() {
        let flows = vec![flow("card", 2)];
        let events = due_cash_flow_events(&flows, date(2025, 1, 26));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].date, date(2025, 2, 2));
    }

    #[test]
    fn test_message_mentions_title() {
        let event = DueEvent {
            cash_flow_id: "a".to_string(),
            title: "Rent".to_string(),
            amount: -800_000,
            when: DueWhen::Today,
            date: date(2025, 6, 1),
        };
        assert_eq!(event.message().title, "Due today: Rent");
    }

    struct GoneSender;

    #[async_trait]
    impl PushSender for GoneSender {
        async fn send(&self, _: &push_subscription::Model, _: &PushMessage) -> PushOutcome {
            PushOutcome::Expired
        }
    }

    fn recipient(id: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            email: format!("{id}@example.com"),
            nickname: id.to_string(),
            password_hash: String::new(),
            role: user::UserRole::User,
            email_verified: Some(Utc::now().into()),
            two_factor_enabled: false,
            notifications_enabled: true,
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
    async fn test_failing_recipient_does_not_lose_expired_batch() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        let subscription = push_subscription::Model {
            id: "s1".to_string(),
            user_id: "bob".to_string(),
            endpoint: "https://push.example/gone".to_string(),
            p256dh: "key".to_string(),
            auth: "auth".to_string(),
            created_at: now.into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![recipient("alice"), recipient("bob")]])
                .append_query_errors([DbErr::Custom("connection reset".to_string())])
                .append_query_results([vec![flow("f1", 1)]])
                .append_query_results([vec![subscription]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let users = UserRepository::new(Arc::clone(&db));
        let sweeper = SweeperService::new(
            users.clone(),
            VerificationTokenRepository::new(Arc::clone(&db)),
            PushSubscriptionRepository::new(Arc::clone(&db)),
            AssetRepository::new(Arc::clone(&db)),
            LifecycleService::new(users),
            Some(Arc::new(GoneSender)),
        );

        let report = sweeper.run_notifications(now).await.unwrap();

        assert_eq!(report.failed, 1);
        assert_eq!(report.expired_removed, 1);
    }
}
