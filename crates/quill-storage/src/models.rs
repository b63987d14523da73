// Database models (internal, may differ from public DTOs)

use chrono::{DateTime, Utc};
use sqlx::FromRow;

// ============================================
// Users
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// Argon2id PHC string. Stays inside the storage layer.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

// ============================================
// Articles
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct ArticleRow {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_id: i64,
    pub likes: i64,
    pub published_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Article joined with its author, for the single-article endpoint.
#[derive(Debug, Clone, FromRow)]
pub struct ArticleWithAuthorRow {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_id: i64,
    pub likes: i64,
    pub published_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author_username: String,
    pub author_email: String,
}

/// Front-page summary row.
#[derive(Debug, Clone, FromRow)]
pub struct LatestArticleRow {
    pub id: i64,
    pub title: String,
    pub author_name: String,
    pub likes: i64,
    pub published_at: DateTime<Utc>,
}

/// `author_id` is not optional: an article cannot exist without an owner.
#[derive(Debug, Clone)]
pub struct CreateArticle {
    pub title: String,
    pub content: String,
    pub author_id: i64,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateArticle {
    pub title: Option<String>,
    pub content: Option<String>,
}

// ============================================
// Comments
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct CommentRow {
    pub id: i64,
    pub article_id: i64,
    pub user_id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateComment {
    pub article_id: i64,
    pub user_id: i64,
    pub text: String,
}

/// LIMIT/OFFSET pair, validated by the API layer before it gets here.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}
