//! Account lifecycle: suspension, appeals and the soft-delete grace window.
//!
//! Every operation re-reads the caller from the store before acting. Session
//! claims may be stale, so neither role nor ownership is taken from them.

use chrono::{DateTime, Duration, Utc};
use finboard_common::{
    AppError, AppResult,
    rules::{MAX_TEXT_CHARS, required_text},
};
use finboard_db::{
    entities::user::{self, UserRole},
    repositories::UserRepository,
};
use sea_orm::Set;
use serde::Serialize;
use tracing::info;

/// Length of the soft-delete grace window, in hours.
pub const GRACE_PERIOD_HOURS: i64 = 24;

/// The soft-delete grace window.
#[must_use]
pub fn grace_period() -> Duration {
    Duration::hours(GRACE_PERIOD_HOURS)
}

/// Whether a soft delete requested at `deleted_at` has run out its grace window.
#[must_use]
pub fn is_grace_expired(deleted_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - deleted_at > grace_period()
}

/// Coarse account state as routed by the product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AccountState {
    /// No restriction.
    Active,
    /// Blocked by an admin. Takes precedence over a pending deletion.
    Suspended,
    /// Deletion requested, grace window running.
    SoftDeletePending,
}

impl AccountState {
    /// Derive the state from a user row.
    #[must_use]
    pub const fn of(user: &user::Model) -> Self {
        if user.suspended {
            Self::Suspended
        } else if user.deleted_at.is_some() {
            Self::SoftDeletePending
        } else {
            Self::Active
        }
    }
}

/// The caller's own profile and lifecycle flags.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub id: String,
    pub email: String,
    pub nickname: String,
    pub role: UserRole,
    pub email_verified: Option<DateTime<Utc>>,
    pub two_factor_enabled: bool,
    pub notifications_enabled: bool,
    pub state: AccountState,
    pub suspended: bool,
    pub suspended_reason: Option<String>,
    pub suspended_appeal: Option<String>,
    pub deleted_at: Option<DateTime<Utc>>,
    /// When the pending deletion becomes final.
    pub deletion_scheduled_for: Option<DateTime<Utc>>,
    /// Set once after a cancelled deletion, for a one-time notice.
    pub reactivated_at: Option<DateTime<Utc>>,
}

impl From<user::Model> for AccountView {
    fn from(user: user::Model) -> Self {
        let state = AccountState::of(&user);
        let deleted_at = user.deleted_at.map(|d| d.with_timezone(&Utc));
        Self {
            id: user.id,
            email: user.email,
            nickname: user.nickname,
            role: user.role,
            email_verified: user.email_verified.map(|d| d.with_timezone(&Utc)),
            two_factor_enabled: user.two_factor_enabled,
            notifications_enabled: user.notifications_enabled,
            state,
            suspended: user.suspended,
            suspended_reason: user.suspended_reason,
            suspended_appeal: user.suspended_appeal,
            deleted_at,
            deletion_scheduled_for: deleted_at.map(|d| d + grace_period()),
            reactivated_at: user.reactivated_at.map(|d| d.with_timezone(&Utc)),
        }
    }
}

/// Entry in the admin appeal queue.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppealEntry {
    pub user_id: String,
    pub nickname: String,
    pub email: String,
    pub suspended_reason: Option<String>,
    pub appeal: String,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Account lifecycle manager.
#[derive(Clone)]
pub struct LifecycleService {
    user_repo: UserRepository,
}

impl LifecycleService {
    /// Create a new lifecycle service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self { user_repo }
    }

    /// Load `caller_id` and require the admin role on the live row.
    pub async fn require_admin(&self, caller_id: &str) -> AppResult<user::Model> {
        let caller = self
            .user_repo
            .find_by_id(caller_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("session user no longer exists".to_string()))?;

        if caller.role != UserRole::Admin {
            return Err(AppError::permission_denied("admin role required"));
        }

        Ok(caller)
    }

    async fn load_self(&self, caller_id: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_id(caller_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("session user no longer exists".to_string()))
    }

    // ========== Admin actions ==========

    /// Suspend a user. Re-suspending overwrites the reason.
    pub async fn suspend(
        &self,
        admin_id: &str,
        user_id: &str,
        reason: &str,
        now: DateTime<Utc>,
    ) -> AppResult<user::Model> {
        self.require_admin(admin_id).await?;
        let reason = required_text("reason", reason, MAX_TEXT_CHARS)?;

        if admin_id == user_id {
            return Err(AppError::validation("cannot suspend yourself"));
        }

        let target = self.user_repo.get_by_id(user_id).await?;

        let mut model: user::ActiveModel = target.into();
        model.suspended = Set(true);
        model.suspended_reason = Set(Some(reason));
        model.updated_at = Set(Some(now.into()));

        let updated = self.user_repo.update(model).await?;
        info!(user_id = %user_id, admin_id = %admin_id, "User suspended");
        Ok(updated)
    }

    /// Lift a suspension, clearing reason and appeal together.
    pub async fn unsuspend(
        &self,
        admin_id: &str,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<user::Model> {
        self.require_admin(admin_id).await?;
        let target = self.user_repo.get_by_id(user_id).await?;

        let mut model: user::ActiveModel = target.into();
        model.suspended = Set(false);
        model.suspended_reason = Set(None);
        model.suspended_appeal = Set(None);
        model.updated_at = Set(Some(now.into()));

        let updated = self.user_repo.update(model).await?;
        info!(user_id = %user_id, admin_id = %admin_id, "User unsuspended");
        Ok(updated)
    }

    /// Suspended users with an appeal on file.
    pub async fn list_suspended_appeals(&self, admin_id: &str) -> AppResult<Vec<AppealEntry>> {
        self.require_admin(admin_id).await?;

        let users = self.user_repo.find_suspended_with_appeal().await?;
        Ok(users
            .into_iter()
            .filter_map(|u| {
                Some(AppealEntry {
                    appeal: u.suspended_appeal?,
                    user_id: u.id,
                    nickname: u.nickname,
                    email: u.email,
                    suspended_reason: u.suspended_reason,
                    updated_at: u.updated_at.map(|d| d.with_timezone(&Utc)),
                })
            })
            .collect())
    }

    /// Immediately remove an account and its content.
    pub async fn admin_delete_user(&self, admin_id: &str, user_id: &str) -> AppResult<()> {
        self.require_admin(admin_id).await?;

        if admin_id == user_id {
            return Err(AppError::validation("cannot delete your own account here"));
        }

        if !self.hard_delete(user_id).await? {
            return Err(AppError::UserNotFound(user_id.to_string()));
        }
        Ok(())
    }

    // ========== Self-service ==========

    /// The caller's profile and lifecycle flags.
    pub async fn me(&self, caller_id: &str) -> AppResult<AccountView> {
        Ok(self.load_self(caller_id).await?.into())
    }

    /// Submit appeal text for the caller's own suspension.
    pub async fn file_appeal(
        &self,
        caller_id: &str,
        user_id: &str,
        appeal: &str,
        now: DateTime<Utc>,
    ) -> AppResult<user::Model> {
        if caller_id != user_id {
            return Err(AppError::permission_denied(
                "appeals can only be filed for your own account",
            ));
        }
        let appeal = required_text("appeal", appeal, MAX_TEXT_CHARS)?;

        let user = self.load_self(caller_id).await?;
        if !user.suspended {
            return Err(AppError::validation("account is not suspended"));
        }

        let mut model: user::ActiveModel = user.into();
        model.suspended_appeal = Set(Some(appeal));
        model.updated_at = Set(Some(now.into()));

        let updated = self.user_repo.update(model).await?;
        info!(user_id = %user_id, "Suspension appeal filed");
        Ok(updated)
    }

    /// Start the grace window. A pending request keeps its original time.
    pub async fn request_soft_delete(
        &self,
        caller_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<user::Model> {
        let user = self.load_self(caller_id).await?;
        if user.deleted_at.is_some() {
            return Ok(user);
        }

        let mut model: user::ActiveModel = user.into();
        model.deleted_at = Set(Some(now.into()));
        model.reactivated_at = Set(None);
        model.updated_at = Set(Some(now.into()));

        let updated = self.user_repo.update(model).await?;
        info!(user_id = %caller_id, "Account deletion requested");
        Ok(updated)
    }

    /// Cancel a pending deletion.
    ///
    /// Past the grace window the deletion is carried out instead and the
    /// account is reported as gone.
    pub async fn cancel_soft_delete(
        &self,
        caller_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<user::Model> {
        let user = self.load_self(caller_id).await?;

        let Some(deleted_at) = user.deleted_at else {
            return Ok(user);
        };

        if is_grace_expired(deleted_at.with_timezone(&Utc), now) {
            self.hard_delete(&user.id).await?;
            return Err(AppError::UserNotFound(user.id));
        }

        self.reactivate(user, now).await
    }

    /// Clear `deleted_at` and leave a reactivation notice.
    pub async fn reactivate(&self, user: user::Model, now: DateTime<Utc>) -> AppResult<user::Model> {
        let user_id = user.id.clone();

        let mut model: user::ActiveModel = user.into();
        model.deleted_at = Set(None);
        model.reactivated_at = Set(Some(now.into()));
        model.updated_at = Set(Some(now.into()));

        let updated = self.user_repo.update(model).await?;
        info!(user_id = %user_id, "Account deletion cancelled");
        Ok(updated)
    }

    /// Drop the one-time reactivation notice.
    pub async fn clear_reactivation_notice(&self, caller_id: &str) -> AppResult<user::Model> {
        let user = self.load_self(caller_id).await?;
        if user.reactivated_at.is_none() {
            return Ok(user);
        }

        let mut model: user::ActiveModel = user.into();
        model.reactivated_at = Set(None);
        self.user_repo.update(model).await
    }

    /// Toggle cash-flow push reminders for the caller.
    pub async fn set_notifications(
        &self,
        caller_id: &str,
        enabled: bool,
        now: DateTime<Utc>,
    ) -> AppResult<user::Model> {
        let user = self.load_self(caller_id).await?;

        let mut model: user::ActiveModel = user.into();
        model.notifications_enabled = Set(enabled);
        model.updated_at = Set(Some(now.into()));
        self.user_repo.update(model).await
    }

    /// Remove the user row and all owned content. Irreversible.
    pub async fn hard_delete(&self, user_id: &str) -> AppResult<bool> {
        let removed = self.user_repo.hard_delete(user_id).await?;
        if removed {
            info!(user_id = %user_id, "Account hard-deleted");
        }
        Ok(removed)
    }
}
