// Common DTOs shared across API endpoints.

use axum::extract::{FromRef, FromRequestParts, Query};
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use quill_storage::Page;

use super::error::ApiError;
use crate::AppState;

/// Standard error envelope for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message describing what went wrong.
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Raw pagination query parameters.
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Bounds-checked pagination. Extraction rejects out-of-range values with
/// 400 before any resource loading or data access happens.
#[derive(Debug, Clone, Copy)]
pub struct ValidPage(pub Page);

#[axum::async_trait]
impl<S> FromRequestParts<S> for ValidPage
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<PageQuery>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::bad_request(e.to_string()))?;

        let app = AppState::from_ref(state);
        let page = app.validator.page(query.limit, query.offset)?;

        Ok(ValidPage(page))
    }
}
