//! Inquiry repository.

use std::sync::Arc;

use crate::entities::{
    Inquiry, InquiryAnswer,
    inquiry::{self, InquiryStatus},
    inquiry_answer,
};
use finboard_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, TransactionTrait, sea_query::Expr,
};

/// Inquiry repository for database operations.
#[derive(Clone)]
pub struct InquiryRepository {
    db: Arc<DatabaseConnection>,
}

impl InquiryRepository {
    /// Create a new inquiry repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a new inquiry.
    pub async fn create(&self, model: inquiry::ActiveModel) -> AppResult<inquiry::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get an inquiry by ID.
    pub async fn get_by_id(&self, id: &str) -> AppResult<inquiry::Model> {
        Inquiry::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Inquiry {id} not found")))
    }

    /// Inquiries filed by a user, newest first.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<inquiry::Model>> {
        Inquiry::find()
            .filter(inquiry::Column::UserId.eq(user_id))
            .order_by_desc(inquiry::Column::CreatedAt)
            .order_by_desc(inquiry::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All inquiries, newest first, optionally filtered by status.
    pub async fn find_all(&self, status: Option<InquiryStatus>) -> AppResult<Vec<inquiry::Model>> {
        let mut query = Inquiry::find();

        if let Some(status) = status {
            query = query.filter(inquiry::Column::Status.eq(status));
        }

        query
            .order_by_desc(inquiry::Column::CreatedAt)
            .order_by_desc(inquiry::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count inquiries holding `status`.
    pub async fn count_by_status(&self, status: InquiryStatus) -> AppResult<u64> {
        Inquiry::find()
            .filter(inquiry::Column::Status.eq(status))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Answers to an inquiry, oldest first.
    pub async fn find_answers(&self, inquiry_id: &str) -> AppResult<Vec<inquiry_answer::Model>> {
        InquiryAnswer::find()
            .filter(inquiry_answer::Column::InquiryId.eq(inquiry_id))
            .order_by_asc(inquiry_answer::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert an answer and mark its inquiry answered as one unit.
    ///
    /// Either both writes land or neither does.
    pub async fn insert_answer(
        &self,
        answer: inquiry_answer::ActiveModel,
    ) -> AppResult<inquiry_answer::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let answer = answer
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let result = Inquiry::update_many()
            .col_expr(
                inquiry::Column::Status,
                Expr::value(InquiryStatus::Answered),
            )
            .filter(inquiry::Column::Id.eq(answer.inquiry_id.as_str()))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            // Dropping the transaction rolls the answer back
            return Err(AppError::NotFound(format!(
                "Inquiry {} not found",
                answer.inquiry_id
            )));
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(answer)
    }
}
