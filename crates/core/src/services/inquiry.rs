//! Support inquiry desk.

use chrono::{DateTime, Utc};
use finboard_common::{
    AppError, AppResult, IdGenerator,
    rules::{MAX_TEXT_CHARS, MAX_TITLE_CHARS, required_text},
};
use finboard_db::{
    entities::{
        inquiry::{self, InquiryStatus},
        inquiry_answer,
        user::UserRole,
    },
    repositories::{InquiryRepository, UserRepository},
};
use sea_orm::Set;
use serde::Serialize;
use tracing::info;

use super::lifecycle::LifecycleService;

/// An inquiry together with its answers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InquiryDetail {
    #[serde(flatten)]
    pub inquiry: inquiry::Model,
    pub answers: Vec<inquiry_answer::Model>,
}

/// Pending/answered split of the admin queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InquiryStats {
    pub pending: u64,
    pub answered: u64,
    pub total: u64,
}

/// Inquiry service.
#[derive(Clone)]
pub struct InquiryService {
    inquiry_repo: InquiryRepository,
    user_repo: UserRepository,
    lifecycle: LifecycleService,
    id_gen: IdGenerator,
}

impl InquiryService {
    /// Create a new inquiry service.
    #[must_use]
    pub const fn new(
        inquiry_repo: InquiryRepository,
        user_repo: UserRepository,
        lifecycle: LifecycleService,
    ) -> Self {
        Self {
            inquiry_repo,
            user_repo,
            lifecycle,
            id_gen: IdGenerator::new(),
        }
    }

    /// Open a new inquiry.
    pub async fn create_inquiry(
        &self,
        caller_id: &str,
        title: &str,
        content: &str,
        now: DateTime<Utc>,
    ) -> AppResult<inquiry::Model> {
        let title = required_text("title", title, MAX_TITLE_CHARS)?;
        let content = required_text("content", content, MAX_TEXT_CHARS)?;

        let inquiry = self
            .inquiry_repo
            .create(inquiry::ActiveModel {
                id: Set(self.id_gen.generate()),
                user_id: Set(caller_id.to_string()),
                title: Set(title),
                content: Set(content),
                status: Set(InquiryStatus::Pending),
                created_at: Set(now.into()),
            })
            .await?;

        info!(inquiry_id = %inquiry.id, user_id = %caller_id, "Inquiry created");
        Ok(inquiry)
    }

    /// The caller's inquiries, newest first.
    pub async fn list_own_inquiries(&self, caller_id: &str) -> AppResult<Vec<inquiry::Model>> {
        self.inquiry_repo.find_by_user(caller_id).await
    }

    /// One inquiry with answers. Visible to its owner and to admins.
    pub async fn get_inquiry(&self, caller_id: &str, id: &str) -> AppResult<InquiryDetail> {
        let inquiry = self.inquiry_repo.get_by_id(id).await?;

        if inquiry.user_id != caller_id {
            let caller = self.user_repo.get_by_id(caller_id).await?;
            if caller.role != UserRole::Admin {
                return Err(AppError::permission_denied("not your inquiry"));
            }
        }

        let answers = self.inquiry_repo.find_answers(id).await?;
        Ok(InquiryDetail { inquiry, answers })
    }

    /// Every inquiry, optionally filtered by status.
    pub async fn list_all_inquiries(
        &self,
        admin_id: &str,
        status: Option<InquiryStatus>,
    ) -> AppResult<Vec<inquiry::Model>> {
        self.lifecycle.require_admin(admin_id).await?;
        self.inquiry_repo.find_all(status).await
    }

    /// Answer an inquiry. The answer and the status flip commit together.
    pub async fn answer_inquiry(
        &self,
        admin_id: &str,
        inquiry_id: &str,
        content: &str,
        now: DateTime<Utc>,
    ) -> AppResult<InquiryDetail> {
        self.lifecycle.require_admin(admin_id).await?;
        let content = required_text("content", content, MAX_TEXT_CHARS)?;

        // NotFound before any write
        self.inquiry_repo.get_by_id(inquiry_id).await?;

        self.inquiry_repo
            .insert_answer(inquiry_answer::ActiveModel {
                id: Set(self.id_gen.generate()),
                inquiry_id: Set(inquiry_id.to_string()),
                admin_id: Set(admin_id.to_string()),
                content: Set(content),
                created_at: Set(now.into()),
            })
            .await?;

        info!(inquiry_id = %inquiry_id, admin_id = %admin_id, "Inquiry answered");

        let inquiry = self.inquiry_repo.get_by_id(inquiry_id).await?;
        let answers = self.inquiry_repo.find_answers(inquiry_id).await?;
        Ok(InquiryDetail { inquiry, answers })
    }

    /// Pending and answered counts.
    pub async fn inquiry_stats(&self, admin_id: &str) -> AppResult<InquiryStats> {
        self.lifecycle.require_admin(admin_id).await?;

        let pending = self
            .inquiry_repo
            .count_by_status(InquiryStatus::Pending)
            .await?;
        let answered = self
            .inquiry_repo
            .count_by_status(InquiryStatus::Answered)
            .await?;

        Ok(InquiryStats {
            pending,
            answered,
            total: pending + answered,
        })
    }
}
