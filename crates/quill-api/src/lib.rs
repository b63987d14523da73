// Quill API library
// Decision: Keep the router assembly in the library so integration tests can
//           drive the full HTTP surface without a listening socket.

pub mod api;
pub mod auth;
pub mod config;
pub mod openapi;

use std::sync::Arc;

use axum::Router;

use quill_storage::StorageBackend;

use crate::api::RequestValidator;
use crate::auth::TokenService;
use crate::config::AuthConfig;

/// App state shared across routes.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<StorageBackend>,
    pub tokens: Arc<TokenService>,
    pub validator: Arc<RequestValidator>,
}

impl AppState {
    pub fn new(db: StorageBackend, auth: &AuthConfig) -> Self {
        Self {
            db: Arc::new(db),
            tokens: Arc::new(TokenService::new(auth)),
            validator: Arc::new(RequestValidator::new()),
        }
    }
}

/// Assemble every API route onto one router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(auth::routes(state.clone()))
        .merge(api::users::routes(state.clone()))
        .merge(api::articles::routes(state))
}

/// Nest the API routes under an optional prefix (e.g. "/api/v1").
pub fn build_router_with_prefix(api_routes: Router, api_prefix: &str) -> Router {
    if api_prefix.is_empty() {
        api_routes
    } else {
        Router::new().nest(api_prefix, api_routes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;
    use axum::{body::Body, http::Request};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_routes() -> Router {
        Router::new().route("/articles", get(|| async { "ok" }))
    }

    #[tokio::test]
    async fn empty_prefix_leaves_routes_at_the_root() {
        let app = build_router_with_prefix(test_routes(), "");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/articles")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn prefix_moves_every_route() {
        let app = build_router_with_prefix(test_routes(), "/api/v1");

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/articles")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/articles")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), 404);
    }
}
