// Repository layer for database operations

use std::time::Duration;

use anyhow::Result;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;

use crate::models::*;

/// Per-statement execution bound, applied on every pooled connection.
const STATEMENT_TIMEOUT: &str = "10s";

/// Pool sizing knobs, surfaced so the binary can wire them from env.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub idle_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 30,
            idle_timeout: Duration::from_secs(15 * 60),
        }
    }
}

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create database connection from URL.
    ///
    /// Every connection carries a server-side `statement_timeout` so a single
    /// slow query cannot hold a request past its budget.
    pub async fn from_url(database_url: &str, config: PoolConfig) -> Result<Self> {
        let options: PgConnectOptions = database_url.parse()?;
        let options = options.options([("statement_timeout", STATEMENT_TIMEOUT)]);

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .idle_timeout(config.idle_timeout)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run the bundled schema migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("database migrations applied");
        Ok(())
    }

    // ============================================
    // Users
    // ============================================

    pub async fn create_user(&self, input: CreateUser) -> Result<UserRow> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password_hash, created_at
            "#,
        )
        .bind(&input.username)
        .bind(&input.email)
        .bind(&input.password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_user(&self, id: i64) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    // ============================================
    // Articles
    // ============================================

    pub async fn latest_articles(&self) -> Result<Vec<LatestArticleRow>> {
        let rows = sqlx::query_as::<_, LatestArticleRow>(
            r#"
            SELECT
                a.id,
                a.title,
                u.username AS author_name,
                (SELECT COUNT(*) FROM article_likes l WHERE l.article_id = a.id) AS likes,
                a.published_at
            FROM articles a
            JOIN users u ON u.id = a.author_id
            ORDER BY a.published_at DESC
            LIMIT 10
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn get_article(&self, id: i64) -> Result<Option<ArticleWithAuthorRow>> {
        let row = sqlx::query_as::<_, ArticleWithAuthorRow>(
            r#"
            SELECT
                a.id,
                a.title,
                a.content,
                a.author_id,
                (SELECT COUNT(*) FROM article_likes l WHERE l.article_id = a.id) AS likes,
                a.published_at,
                a.updated_at,
                u.username AS author_username,
                u.email AS author_email
            FROM articles a
            JOIN users u ON u.id = a.author_id
            WHERE a.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn articles_by_author(&self, author_id: i64, page: Page) -> Result<Vec<ArticleRow>> {
        let rows = sqlx::query_as::<_, ArticleRow>(
            r#"
            SELECT
                a.id,
                a.title,
                a.content,
                a.author_id,
                (SELECT COUNT(*) FROM article_likes l WHERE l.article_id = a.id) AS likes,
                a.published_at,
                a.updated_at
            FROM articles a
            WHERE a.author_id = $1
            ORDER BY a.published_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(author_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn create_article(&self, input: CreateArticle) -> Result<ArticleRow> {
        let row = sqlx::query_as::<_, ArticleRow>(
            r#"
            INSERT INTO articles (title, content, author_id)
            VALUES ($1, $2, $3)
            RETURNING id, title, content, author_id, 0::BIGINT AS likes, published_at, updated_at
            "#,
        )
        .bind(&input.title)
        .bind(&input.content)
        .bind(input.author_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn update_article(&self, id: i64, input: UpdateArticle) -> Result<Option<ArticleRow>> {
        let row = sqlx::query_as::<_, ArticleRow>(
            r#"
            UPDATE articles
            SET
                title = COALESCE($2, title),
                content = COALESCE($3, content),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, content, author_id,
                (SELECT COUNT(*) FROM article_likes l WHERE l.article_id = articles.id) AS likes,
                published_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&input.title)
        .bind(&input.content)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn delete_article(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // ============================================
    // Comments
    // ============================================

    pub async fn comments_for_article(&self, article_id: i64, page: Page) -> Result<Vec<CommentRow>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, article_id, user_id, text, created_at
            FROM comments
            WHERE article_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(article_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn create_comment(&self, input: CreateComment) -> Result<CommentRow> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            INSERT INTO comments (article_id, user_id, text)
            VALUES ($1, $2, $3)
            RETURNING id, article_id, user_id, text, created_at
            "#,
        )
        .bind(input.article_id)
        .bind(input.user_id)
        .bind(&input.text)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    // ============================================
    // Likes
    // ============================================

    /// Idempotent: liking twice is a no-op, not an error.
    pub async fn add_like(&self, article_id: i64, user_id: i64) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO article_likes (article_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(article_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
