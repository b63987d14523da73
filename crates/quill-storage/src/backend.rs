// Storage backend abstraction
// Decision: Use enum dispatch for simplicity over trait objects

use std::sync::Arc;

use anyhow::Result;
use sqlx::PgPool;

use crate::memory::InMemoryDatabase;
use crate::models::*;
use crate::repositories::{Database, PoolConfig};

/// Storage backend that can be either PostgreSQL or in-memory.
#[derive(Clone)]
pub enum StorageBackend {
    /// PostgreSQL database (production)
    Postgres(Database),
    /// In-memory database (dev mode)
    InMemory(Arc<InMemoryDatabase>),
}

impl StorageBackend {
    /// Create a PostgreSQL storage backend from a database URL.
    pub async fn postgres(database_url: &str, config: PoolConfig) -> Result<Self> {
        let db = Database::from_url(database_url, config).await?;
        db.migrate().await?;
        Ok(Self::Postgres(db))
    }

    /// Create an in-memory storage backend.
    pub fn in_memory() -> Self {
        Self::InMemory(Arc::new(InMemoryDatabase::new()))
    }

    /// Check if this is dev mode (in-memory).
    pub fn is_dev_mode(&self) -> bool {
        matches!(self, Self::InMemory(_))
    }

    /// Get the PostgreSQL pool if using the PostgreSQL backend.
    pub fn pool(&self) -> Option<&PgPool> {
        match self {
            Self::Postgres(db) => Some(db.pool()),
            Self::InMemory(_) => None,
        }
    }

    // ============================================
    // Users
    // ============================================

    pub async fn create_user(&self, input: CreateUser) -> Result<UserRow> {
        match self {
            Self::Postgres(db) => db.create_user(input).await,
            Self::InMemory(db) => db.create_user(input).await,
        }
    }

    pub async fn get_user(&self, id: i64) -> Result<Option<UserRow>> {
        match self {
            Self::Postgres(db) => db.get_user(id).await,
            Self::InMemory(db) => db.get_user(id).await,
        }
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        match self {
            Self::Postgres(db) => db.get_user_by_email(email).await,
            Self::InMemory(db) => db.get_user_by_email(email).await,
        }
    }

    // ============================================
    // Articles
    // ============================================

    pub async fn latest_articles(&self) -> Result<Vec<LatestArticleRow>> {
        match self {
            Self::Postgres(db) => db.latest_articles().await,
            Self::InMemory(db) => db.latest_articles().await,
        }
    }

    pub async fn get_article(&self, id: i64) -> Result<Option<ArticleWithAuthorRow>> {
        match self {
            Self::Postgres(db) => db.get_article(id).await,
            Self::InMemory(db) => db.get_article(id).await,
        }
    }

    pub async fn articles_by_author(&self, author_id: i64, page: Page) -> Result<Vec<ArticleRow>> {
        match self {
            Self::Postgres(db) => db.articles_by_author(author_id, page).await,
            Self::InMemory(db) => db.articles_by_author(author_id, page).await,
        }
    }

    pub async fn create_article(&self, input: CreateArticle) -> Result<ArticleRow> {
        match self {
            Self::Postgres(db) => db.create_article(input).await,
            Self::InMemory(db) => db.create_article(input).await,
        }
    }

    pub async fn update_article(&self, id: i64, input: UpdateArticle) -> Result<Option<ArticleRow>> {
        match self {
            Self::Postgres(db) => db.update_article(id, input).await,
            Self::InMemory(db) => db.update_article(id, input).await,
        }
    }

    pub async fn delete_article(&self, id: i64) -> Result<bool> {
        match self {
            Self::Postgres(db) => db.delete_article(id).await,
            Self::InMemory(db) => db.delete_article(id).await,
        }
    }

    // ============================================
    // Comments
    // ============================================

    pub async fn comments_for_article(&self, article_id: i64, page: Page) -> Result<Vec<CommentRow>> {
        match self {
            Self::Postgres(db) => db.comments_for_article(article_id, page).await,
            Self::InMemory(db) => db.comments_for_article(article_id, page).await,
        }
    }

    pub async fn create_comment(&self, input: CreateComment) -> Result<CommentRow> {
        match self {
            Self::Postgres(db) => db.create_comment(input).await,
            Self::InMemory(db) => db.create_comment(input).await,
        }
    }

    // ============================================
    // Likes
    // ============================================

    pub async fn add_like(&self, article_id: i64, user_id: i64) -> Result<()> {
        match self {
            Self::Postgres(db) => db.add_like(article_id, user_id).await,
            Self::InMemory(db) => db.add_like(article_id, user_id).await,
        }
    }
}
