// Article CRUD, comments, and likes HTTP routes

use axum::extract::{FromRef, FromRequestParts, Path, State};
use axum::http::{request::Parts, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use quill_storage::{
    ArticleRow, ArticleWithAuthorRow, CommentRow, CreateArticle, CreateComment, LatestArticleRow,
    UpdateArticle,
};

use super::common::ValidPage;
use super::error::ApiError;
use crate::auth::{AuthUser, OwnedArticle};
use crate::AppState;

// ============================================
// DTOs
// ============================================

/// Public author fields embedded in article responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Author {
    pub id: i64,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_id: i64,
    pub likes: i64,
    pub published_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ArticleRow> for Article {
    fn from(row: ArticleRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            content: row.content,
            author_id: row.author_id,
            likes: row.likes,
            published_at: row.published_at,
            updated_at: row.updated_at,
        }
    }
}

/// Article with its author embedded, for the single-article endpoint.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ArticleWithAuthor {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_id: i64,
    pub likes: i64,
    pub published_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author: Author,
}

impl From<ArticleWithAuthorRow> for ArticleWithAuthor {
    fn from(row: ArticleWithAuthorRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            content: row.content,
            author_id: row.author_id,
            likes: row.likes,
            published_at: row.published_at,
            updated_at: row.updated_at,
            author: Author {
                id: row.author_id,
                username: row.author_username,
                email: row.author_email,
            },
        }
    }
}

/// Front-page summary.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LatestArticle {
    pub id: i64,
    pub title: String,
    pub author_name: String,
    pub likes: i64,
    pub published_at: DateTime<Utc>,
}

impl From<LatestArticleRow> for LatestArticle {
    fn from(row: LatestArticleRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            author_name: row.author_name,
            likes: row.likes,
            published_at: row.published_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Comment {
    pub id: i64,
    pub article_id: i64,
    pub user_id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.id,
            article_id: row.article_id,
            user_id: row.user_id,
            text: row.text,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateArticleRequest {
    pub title: String,
    pub content: String,
}

/// Only provided fields are updated.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateArticleRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateCommentRequest {
    pub text: String,
}

// ============================================
// Resource loader
// ============================================

/// The article addressed by the `:id` path parameter, loaded with its
/// author. Extraction fails with 400 for a non-integer id and 404 for a
/// missing article, before the handler body runs.
#[derive(Debug, Clone)]
pub struct ArticleCtx(pub ArticleWithAuthorRow);

#[axum::async_trait]
impl<S> FromRequestParts<S> for ArticleCtx
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::bad_request("article id must be an integer"))?;

        let app = AppState::from_ref(state);
        let article = app
            .db
            .get_article(id)
            .await?
            .ok_or_else(|| ApiError::not_found("article not found"))?;

        Ok(ArticleCtx(article))
    }
}

// ============================================
// Routes
// ============================================

/// Create article routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/articles", get(latest_articles).post(create_article))
        .route(
            "/articles/:id",
            get(get_article).patch(update_article).delete(delete_article),
        )
        .route("/articles/author/:id", get(articles_by_author))
        .route(
            "/articles/:id/comments",
            get(article_comments).post(create_comment),
        )
        .route("/articles/:id/like", post(like_article))
        .with_state(state)
}

/// GET /articles - Latest ten article summaries
#[utoipa::path(
    get,
    path = "/articles",
    responses(
        (status = 200, description = "Latest articles", body = Vec<LatestArticle>),
        (status = 500, description = "Internal server error")
    ),
    tag = "articles"
)]
pub async fn latest_articles(
    State(state): State<AppState>,
) -> Result<Json<Vec<LatestArticle>>, ApiError> {
    let rows = state.db.latest_articles().await?;
    Ok(Json(rows.into_iter().map(LatestArticle::from).collect()))
}

/// GET /articles/{id} - Article by id, author embedded
#[utoipa::path(
    get,
    path = "/articles/{id}",
    params(("id" = i64, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Article found", body = ArticleWithAuthor),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "Article not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "articles"
)]
pub async fn get_article(ArticleCtx(article): ArticleCtx) -> Json<ArticleWithAuthor> {
    Json(article.into())
}

/// GET /articles/author/{id} - Articles written by a user, paginated
#[utoipa::path(
    get,
    path = "/articles/author/{id}",
    params(
        ("id" = i64, Path, description = "Author user ID"),
        ("limit" = i64, Query, description = "Page size, 1-10"),
        ("offset" = Option<i64>, Query, description = "Page offset")
    ),
    responses(
        (status = 200, description = "Articles by author", body = Vec<Article>),
        (status = 400, description = "Malformed id or pagination"),
        (status = 500, description = "Internal server error")
    ),
    tag = "articles"
)]
pub async fn articles_by_author(
    State(state): State<AppState>,
    Path(author_id): Path<i64>,
    ValidPage(page): ValidPage,
) -> Result<Json<Vec<Article>>, ApiError> {
    let rows = state.db.articles_by_author(author_id, page).await?;
    Ok(Json(rows.into_iter().map(Article::from).collect()))
}

/// POST /articles - Create an article owned by the caller
#[utoipa::path(
    post,
    path = "/articles",
    request_body = CreateArticleRequest,
    responses(
        (status = 201, description = "Article created", body = Article),
        (status = 400, description = "Validation failure"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    tag = "articles"
)]
pub async fn create_article(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateArticleRequest>,
) -> Result<(StatusCode, Json<Article>), ApiError> {
    state.validator.new_article(&req.title, &req.content)?;

    // The owner comes from the resolved identity, never from the payload.
    let row = state
        .db
        .create_article(CreateArticle {
            title: req.title,
            content: req.content,
            author_id: user.id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(row.into())))
}

/// PATCH /articles/{id} - Update an owned article
#[utoipa::path(
    patch,
    path = "/articles/{id}",
    params(("id" = i64, Path, description = "Article ID")),
    request_body = UpdateArticleRequest,
    responses(
        (status = 200, description = "Updated, body is the article id", body = i64),
        (status = 400, description = "Malformed id or validation failure"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the article owner"),
        (status = 404, description = "Article not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "articles"
)]
pub async fn update_article(
    State(state): State<AppState>,
    owned: OwnedArticle,
    Json(req): Json<UpdateArticleRequest>,
) -> Result<Json<i64>, ApiError> {
    state
        .validator
        .article_update(req.title.as_deref(), req.content.as_deref())?;

    let updated = state
        .db
        .update_article(
            owned.article.id,
            UpdateArticle {
                title: req.title,
                content: req.content,
            },
        )
        .await?
        .ok_or_else(|| ApiError::not_found("article not found"))?;

    Ok(Json(updated.id))
}

/// DELETE /articles/{id} - Delete an owned article
#[utoipa::path(
    delete,
    path = "/articles/{id}",
    params(("id" = i64, Path, description = "Article ID")),
    responses(
        (status = 204, description = "Article deleted"),
        (status = 400, description = "Malformed id"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the article owner"),
        (status = 404, description = "Article not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "articles"
)]
pub async fn delete_article(
    State(state): State<AppState>,
    owned: OwnedArticle,
) -> Result<StatusCode, ApiError> {
    let deleted = state.db.delete_article(owned.article.id).await?;
    if !deleted {
        return Err(ApiError::not_found("article not found"));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// GET /articles/{id}/comments - Comments on an article, paginated
#[utoipa::path(
    get,
    path = "/articles/{id}/comments",
    params(
        ("id" = i64, Path, description = "Article ID"),
        ("limit" = i64, Query, description = "Page size, 1-10"),
        ("offset" = Option<i64>, Query, description = "Page offset")
    ),
    responses(
        (status = 200, description = "Comments", body = Vec<Comment>),
        (status = 400, description = "Malformed id or pagination"),
        (status = 404, description = "Article not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "articles"
)]
pub async fn article_comments(
    State(state): State<AppState>,
    // Pagination bounds are checked before the article is loaded.
    ValidPage(page): ValidPage,
    ArticleCtx(article): ArticleCtx,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let rows = state.db.comments_for_article(article.id, page).await?;
    Ok(Json(rows.into_iter().map(Comment::from).collect()))
}

/// POST /articles/{id}/comments - Comment on an article
#[utoipa::path(
    post,
    path = "/articles/{id}/comments",
    params(("id" = i64, Path, description = "Article ID")),
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Created, body is the comment id", body = i64),
        (status = 400, description = "Malformed id or validation failure"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Article not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "articles"
)]
pub async fn create_comment(
    State(state): State<AppState>,
    user: AuthUser,
    ArticleCtx(article): ArticleCtx,
    Json(req): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<i64>), ApiError> {
    state.validator.comment(&req.text)?;

    let comment = state
        .db
        .create_comment(CreateComment {
            article_id: article.id,
            user_id: user.id,
            text: req.text,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(comment.id)))
}

/// POST /articles/{id}/like - Like an article (idempotent)
#[utoipa::path(
    post,
    path = "/articles/{id}/like",
    params(("id" = i64, Path, description = "Article ID")),
    responses(
        (status = 201, description = "Like recorded"),
        (status = 400, description = "Malformed id"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Article not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "articles"
)]
pub async fn like_article(
    State(state): State<AppState>,
    user: AuthUser,
    ArticleCtx(article): ArticleCtx,
) -> Result<StatusCode, ApiError> {
    state.db.add_like(article.id, user.id).await?;
    Ok(StatusCode::CREATED)
}
