// In-memory storage implementation for dev mode
// Decision: Use parking_lot for thread-safe access
//
// Provides the same API surface as the Postgres repository, backed by
// HashMaps. Lets the server run (and the integration tests drive the full
// router) without a database. All data is lost on restart.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::models::*;

#[derive(Default)]
pub struct InMemoryDatabase {
    users: RwLock<HashMap<i64, UserRow>>,
    articles: RwLock<HashMap<i64, ArticleRow>>,
    comments: RwLock<HashMap<i64, CommentRow>>,
    likes: RwLock<HashSet<(i64, i64)>>,
    next_id: AtomicI64,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            ..Default::default()
        }
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    fn alloc_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn like_count(&self, article_id: i64) -> i64 {
        self.likes
            .read()
            .iter()
            .filter(|(a, _)| *a == article_id)
            .count() as i64
    }

    // ============================================
    // Users
    // ============================================

    pub async fn create_user(&self, input: CreateUser) -> Result<UserRow> {
        let mut users = self.users.write();
        if users.values().any(|u| u.email == input.email) {
            return Err(anyhow!("duplicate key: users.email"));
        }
        let row = UserRow {
            id: self.alloc_id(),
            username: input.username,
            email: input.email,
            password_hash: input.password_hash,
            created_at: Self::now(),
        };
        users.insert(row.id, row.clone());
        Ok(row)
    }

    pub async fn get_user(&self, id: i64) -> Result<Option<UserRow>> {
        Ok(self.users.read().get(&id).cloned())
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        Ok(self
            .users
            .read()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    // ============================================
    // Articles
    // ============================================

    pub async fn latest_articles(&self) -> Result<Vec<LatestArticleRow>> {
        let users = self.users.read();
        let mut articles: Vec<ArticleRow> = self.articles.read().values().cloned().collect();
        articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));

        let rows = articles
            .into_iter()
            .take(10)
            .map(|a| {
                let author_name = users
                    .get(&a.author_id)
                    .map(|u| u.username.clone())
                    .unwrap_or_default();
                LatestArticleRow {
                    id: a.id,
                    title: a.title,
                    author_name,
                    likes: self.like_count(a.id),
                    published_at: a.published_at,
                }
            })
            .collect();

        Ok(rows)
    }

    pub async fn get_article(&self, id: i64) -> Result<Option<ArticleWithAuthorRow>> {
        let article = match self.articles.read().get(&id).cloned() {
            Some(a) => a,
            None => return Ok(None),
        };
        let author = self
            .users
            .read()
            .get(&article.author_id)
            .cloned()
            .ok_or_else(|| anyhow!("article {} has no author row", id))?;

        Ok(Some(ArticleWithAuthorRow {
            id: article.id,
            title: article.title,
            content: article.content,
            author_id: article.author_id,
            likes: self.like_count(id),
            published_at: article.published_at,
            updated_at: article.updated_at,
            author_username: author.username,
            author_email: author.email,
        }))
    }

    pub async fn articles_by_author(&self, author_id: i64, page: Page) -> Result<Vec<ArticleRow>> {
        let mut rows: Vec<ArticleRow> = self
            .articles
            .read()
            .values()
            .filter(|a| a.author_id == author_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.published_at.cmp(&a.published_at));

        Ok(rows
            .into_iter()
            .skip(page.offset.max(0) as usize)
            .take(page.limit.max(0) as usize)
            .map(|mut a| {
                a.likes = self.like_count(a.id);
                a
            })
            .collect())
    }

    pub async fn create_article(&self, input: CreateArticle) -> Result<ArticleRow> {
        if !self.users.read().contains_key(&input.author_id) {
            return Err(anyhow!("author {} does not exist", input.author_id));
        }
        let now = Self::now();
        let row = ArticleRow {
            id: self.alloc_id(),
            title: input.title,
            content: input.content,
            author_id: input.author_id,
            likes: 0,
            published_at: now,
            updated_at: now,
        };
        self.articles.write().insert(row.id, row.clone());
        Ok(row)
    }

    pub async fn update_article(&self, id: i64, input: UpdateArticle) -> Result<Option<ArticleRow>> {
        let mut articles = self.articles.write();
        if let Some(article) = articles.get_mut(&id) {
            if let Some(title) = input.title {
                article.title = title;
            }
            if let Some(content) = input.content {
                article.content = content;
            }
            article.updated_at = Self::now();
            return Ok(Some(article.clone()));
        }
        Ok(None)
    }

    pub async fn delete_article(&self, id: i64) -> Result<bool> {
        let removed = self.articles.write().remove(&id).is_some();
        if removed {
            self.comments.write().retain(|_, c| c.article_id != id);
            self.likes.write().retain(|(a, _)| *a != id);
        }
        Ok(removed)
    }

    // ============================================
    // Comments
    // ============================================

    pub async fn comments_for_article(&self, article_id: i64, page: Page) -> Result<Vec<CommentRow>> {
        let mut rows: Vec<CommentRow> = self
            .comments
            .read()
            .values()
            .filter(|c| c.article_id == article_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(rows
            .into_iter()
            .skip(page.offset.max(0) as usize)
            .take(page.limit.max(0) as usize)
            .collect())
    }

    pub async fn create_comment(&self, input: CreateComment) -> Result<CommentRow> {
        if !self.articles.read().contains_key(&input.article_id) {
            return Err(anyhow!("article {} does not exist", input.article_id));
        }
        let row = CommentRow {
            id: self.alloc_id(),
            article_id: input.article_id,
            user_id: input.user_id,
            text: input.text,
            created_at: Self::now(),
        };
        self.comments.write().insert(row.id, row.clone());
        Ok(row)
    }

    // ============================================
    // Likes
    // ============================================

    pub async fn add_like(&self, article_id: i64, user_id: i64) -> Result<()> {
        if !self.articles.read().contains_key(&article_id) {
            return Err(anyhow!("article {} does not exist", article_id));
        }
        self.likes.write().insert((article_id, user_id));
        Ok(())
    }
}
