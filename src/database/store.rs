use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::database::models::{NewPost, Post, Subreddit, User, UserPublic, Vote, VoteKind};

/// Fallback for local development when DATABASE_URL is unset.
const DEFAULT_DATABASE_URL: &str = "postgres://localhost:5432/forum";

/// Errors from the Store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violation")]
    UniqueViolation,

    #[error("foreign key constraint violation")]
    ForeignKeyViolation,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Distinguish constraint violations from other database faults so handlers
/// can surface them as normal duplicate / missing-reference failures.
fn classify(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        match db_err.code().as_deref() {
            Some("23505") => return StoreError::UniqueViolation,
            Some("23503") => return StoreError::ForeignKeyViolation,
            _ => {}
        }
    }
    StoreError::Sqlx(err)
}

/// Data store client over a PostgreSQL connection pool. Cloning shares the
/// pool; the pool is the only process-lifetime resource.
#[derive(Clone)]
pub struct Store {
    pool: PgPool,
}

impl Store {
    /// Build the pool from DATABASE_URL. Connections are established lazily
    /// so the server can start (and report degraded health) before the
    /// database is reachable.
    pub fn connect(config: &AppConfig) -> Result<Self, StoreError> {
        let url = std::env::var("DATABASE_URL").unwrap_or_else(|_| {
            warn!("DATABASE_URL not set, falling back to {}", DEFAULT_DATABASE_URL);
            DEFAULT_DATABASE_URL.to_string()
        });

        let pool = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .acquire_timeout(Duration::from_secs(config.database.connection_timeout_secs))
            .connect_lazy(&url)?;

        Ok(Self { pool })
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(classify)?;
        Ok(())
    }

    // ---- users ----

    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, password, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)
    }

    pub async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, password, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)
    }

    pub async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password) VALUES ($1, $2)
             RETURNING id, username, password, created_at",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)
    }

    /// Sanitized user rows for a set of ids, for eager-loading post owners.
    pub async fn users_public_by_ids(&self, ids: &[Uuid]) -> Result<Vec<UserPublic>, StoreError> {
        sqlx::query_as::<_, UserPublic>(
            "SELECT id, username, created_at FROM users WHERE id = ANY($1)",
        )
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await
        .map_err(classify)
    }

    // ---- subreddits ----

    pub async fn list_subreddits(&self) -> Result<Vec<Subreddit>, StoreError> {
        sqlx::query_as::<_, Subreddit>("SELECT id, name, user_id, created_at FROM subreddits")
            .fetch_all(&self.pool)
            .await
            .map_err(classify)
    }

    pub async fn find_subreddit(&self, id: Uuid) -> Result<Option<Subreddit>, StoreError> {
        sqlx::query_as::<_, Subreddit>(
            "SELECT id, name, user_id, created_at FROM subreddits WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)
    }

    pub async fn create_subreddit(&self, name: &str, user_id: Uuid) -> Result<Subreddit, StoreError> {
        sqlx::query_as::<_, Subreddit>(
            "INSERT INTO subreddits (name, user_id) VALUES ($1, $2)
             RETURNING id, name, user_id, created_at",
        )
        .bind(name)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)
    }

    pub async fn delete_subreddit(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM subreddits WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(classify)?;
        Ok(())
    }

    pub async fn subreddits_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Subreddit>, StoreError> {
        sqlx::query_as::<_, Subreddit>(
            "SELECT id, name, user_id, created_at FROM subreddits WHERE id = ANY($1)",
        )
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await
        .map_err(classify)
    }

    // ---- posts ----

    pub async fn list_posts(&self) -> Result<Vec<Post>, StoreError> {
        sqlx::query_as::<_, Post>(
            "SELECT id, text, title, user_id, subreddit_id, parent_id, created_at, updated_at
             FROM posts",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(classify)
    }

    pub async fn find_post(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        sqlx::query_as::<_, Post>(
            "SELECT id, text, title, user_id, subreddit_id, parent_id, created_at, updated_at
             FROM posts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)
    }

    pub async fn create_post(&self, new_post: NewPost) -> Result<Post, StoreError> {
        sqlx::query_as::<_, Post>(
            "INSERT INTO posts (text, title, user_id, subreddit_id, parent_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, text, title, user_id, subreddit_id, parent_id, created_at, updated_at",
        )
        .bind(&new_post.text)
        .bind(&new_post.title)
        .bind(new_post.user_id)
        .bind(new_post.subreddit_id)
        .bind(new_post.parent_id)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)
    }

    /// Partial update: a `None` field leaves the stored value unchanged.
    pub async fn update_post(
        &self,
        id: Uuid,
        title: Option<&str>,
        text: Option<&str>,
    ) -> Result<Post, StoreError> {
        sqlx::query_as::<_, Post>(
            "UPDATE posts
             SET title = COALESCE($2, title), text = COALESCE($3, text), updated_at = now()
             WHERE id = $1
             RETURNING id, text, title, user_id, subreddit_id, parent_id, created_at, updated_at",
        )
        .bind(id)
        .bind(title)
        .bind(text)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)
    }

    pub async fn delete_post(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(classify)?;
        Ok(())
    }

    // ---- votes ----

    pub async fn list_votes(&self, kind: VoteKind) -> Result<Vec<Vote>, StoreError> {
        let sql = format!(
            "SELECT id, user_id, post_id, created_at FROM {}",
            kind.table()
        );
        sqlx::query_as::<_, Vote>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)
    }

    pub async fn find_vote(
        &self,
        kind: VoteKind,
        user_id: Uuid,
        post_id: Uuid,
    ) -> Result<Option<Vote>, StoreError> {
        let sql = format!(
            "SELECT id, user_id, post_id, created_at FROM {} WHERE user_id = $1 AND post_id = $2",
            kind.table()
        );
        sqlx::query_as::<_, Vote>(&sql)
            .bind(user_id)
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)
    }

    pub async fn create_vote(
        &self,
        kind: VoteKind,
        user_id: Uuid,
        post_id: Uuid,
    ) -> Result<Vote, StoreError> {
        let sql = format!(
            "INSERT INTO {} (user_id, post_id) VALUES ($1, $2)
             RETURNING id, user_id, post_id, created_at",
            kind.table()
        );
        sqlx::query_as::<_, Vote>(&sql)
            .bind(user_id)
            .bind(post_id)
            .fetch_one(&self.pool)
            .await
            .map_err(classify)
    }

    pub async fn delete_vote(&self, kind: VoteKind, id: Uuid) -> Result<(), StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", kind.table());
        sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(classify)?;
        Ok(())
    }
}
