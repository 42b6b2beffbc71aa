//! Community board: posts and comments.

use chrono::{DateTime, Utc};
use finboard_common::{
    AppError, AppResult, IdGenerator,
    rules::{MAX_TEXT_CHARS, MAX_TITLE_CHARS, required_text},
};
use finboard_db::{
    entities::{comment, post, user::UserRole},
    repositories::{PostRepository, UserRepository},
};
use sea_orm::Set;
use serde::Serialize;
use tracing::info;

const MAX_PAGE_SIZE: u64 = 100;

/// A post with its comments.
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: post::Model,
    pub comments: Vec<comment::Model>,
}

/// Board service.
#[derive(Clone)]
pub struct BoardService {
    post_repo: PostRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl BoardService {
    /// Create a new board service.
    #[must_use]
    pub const fn new(post_repo: PostRepository, user_repo: UserRepository) -> Self {
        Self {
            post_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Publish a post.
    pub async fn create_post(
        &self,
        caller_id: &str,
        title: &str,
        content: &str,
        now: DateTime<Utc>,
    ) -> AppResult<post::Model> {
        let title = required_text("title", title, MAX_TITLE_CHARS)?;
        let content = required_text("content", content, MAX_TEXT_CHARS)?;

        self.post_repo
            .create(post::ActiveModel {
                id: Set(self.id_gen.generate()),
                author_id: Set(caller_id.to_string()),
                title: Set(title),
                content: Set(content),
                created_at: Set(now.into()),
            })
            .await
    }

    /// Newest posts first.
    pub async fn list_posts(&self, limit: u64, offset: u64) -> AppResult<Vec<post::Model>> {
        self.post_repo
            .list(limit.clamp(1, MAX_PAGE_SIZE), offset)
            .await
    }

    /// A post with its comments.
    pub async fn get_post(&self, id: &str) -> AppResult<PostDetail> {
        let post = self.post_repo.get_by_id(id).await?;
        let comments = self.post_repo.find_comments(id).await?;
        Ok(PostDetail { post, comments })
    }

    /// Delete a post. Allowed for its author and for admins.
    pub async fn delete_post(&self, caller_id: &str, id: &str) -> AppResult<()> {
        let post = self.post_repo.get_by_id(id).await?;
        self.require_author_or_admin(caller_id, &post.author_id)
            .await?;

        self.post_repo.delete(id).await?;
        info!(post_id = %id, user_id = %caller_id, "Post deleted");
        Ok(())
    }

    /// Comment on an existing post.
    pub async fn create_comment(
        &self,
        caller_id: &str,
        post_id: &str,
        content: &str,
        now: DateTime<Utc>,
    ) -> AppResult<comment::Model> {
        let content = required_text("content", content, MAX_TEXT_CHARS)?;
        self.post_repo.get_by_id(post_id).await?;

        self.post_repo
            .create_comment(comment::ActiveModel {
                id: Set(self.id_gen.generate()),
                post_id: Set(post_id.to_string()),
                author_id: Set(caller_id.to_string()),
                content: Set(content),
                created_at: Set(now.into()),
            })
            .await
    }

    /// Delete a comment. Allowed for its author and for admins.
    pub async fn delete_comment(&self, caller_id: &str, id: &str) -> AppResult<()> {
        let comment = self.post_repo.get_comment(id).await?;
        self.require_author_or_admin(caller_id, &comment.author_id)
            .await?;

        self.post_repo.delete_comment(id).await?;
        info!(comment_id = %id, user_id = %caller_id, "Comment deleted");
        Ok(())
    }

    async fn require_author_or_admin(&self, caller_id: &str, author_id: &str) -> AppResult<()> {
        if caller_id == author_id {
            return Ok(());
        }

        let caller = self.user_repo.get_by_id(caller_id).await?;
        if caller.role == UserRole::Admin {
            Ok(())
        } else {
            Err(AppError::permission_denied("only the author or an admin may delete this"))
        }
    }
}
