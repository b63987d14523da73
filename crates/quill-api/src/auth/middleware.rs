// Authentication extractors
// Decision: Typed extractors instead of an ambient request-context bag; a
//           handler states exactly which identity/resource it needs and the
//           ordering is enforced by construction.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::{header, request::Parts};

use crate::api::articles::ArticleCtx;
use crate::api::error::ApiError;
use crate::AppState;

/// The caller identity resolved for one request. Never cached across
/// requests: every authenticated request pays one user lookup.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub email: String,
}

/// Split a `Bearer <token>` header value: exactly two space-separated parts,
/// the first being the literal scheme.
fn parse_bearer(value: &str) -> Option<&str> {
    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) => Some(token),
        _ => None,
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app = AppState::from_ref(state);

        let value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if value.is_empty() {
            return Err(ApiError::unauthorized("authorization header is missing"));
        }

        let token = parse_bearer(value).ok_or_else(|| {
            ApiError::unauthorized("authorization header format must be Bearer {token}")
        })?;

        let claims = app
            .tokens
            .validate(token)
            .map_err(|e| ApiError::unauthorized(e.to_string()))?;

        let user_id: i64 = claims
            .sub
            .parse()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| ApiError::unauthorized("token subject is not a valid user id"))?;

        // A missing user is reported exactly like a bad token: the caller
        // cannot distinguish "bad token" from "deleted account".
        let user = app
            .db
            .get_user(user_id)
            .await
            .map_err(|e| {
                tracing::debug!("identity lookup failed: {e:#}");
                ApiError::unauthorized("unknown user")
            })?
            .ok_or_else(|| ApiError::unauthorized("unknown user"))?;

        Ok(AuthUser {
            id: user.id,
            username: user.username,
            email: user.email,
        })
    }
}

/// Ownership guard for article mutations: resolves the caller, loads the
/// addressed article, and admits the request only when the caller owns it.
#[derive(Debug, Clone)]
pub struct OwnedArticle {
    pub user: AuthUser,
    pub article: quill_storage::ArticleWithAuthorRow,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for OwnedArticle
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Identity first: an unauthenticated request must fail before any
        // article lookup happens.
        let user = AuthUser::from_request_parts(parts, state).await?;
        let ArticleCtx(article) = ArticleCtx::from_request_parts(parts, state).await?;

        if article.author_id != user.id {
            return Err(ApiError::Forbidden);
        }

        Ok(OwnedArticle { user, article })
    }
}
