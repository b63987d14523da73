// Integration tests for the quill API
//
// Drives the full router through tower::ServiceExt::oneshot against the
// in-memory storage backend; no socket, no database.

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use quill_api::auth::Claims;
use quill_api::config::AuthConfig;
use quill_api::{router, AppState};
use quill_storage::StorageBackend;

fn test_state() -> AppState {
    let auth = AuthConfig {
        secret: "integration-test-secret".to_string(),
        issuer: "quill-test".to_string(),
        token_ttl: Duration::from_secs(3600),
    };
    AppState::new(StorageBackend::in_memory(), &auth)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

/// Register a user and log in, returning the token string.
async fn register_and_login(app: &Router, username: &str) -> String {
    let email = format!("{username}@example.com");

    let (status, _) = send(
        app,
        Method::POST,
        "/auth/reg",
        None,
        Some(json!({ "username": username, "email": email, "password": "password1" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(
        app,
        Method::POST,
        "/auth/log",
        None,
        Some(json!({ "email": email, "password": "password1" })),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let token = body.as_str().expect("token string").to_string();
    assert!(!token.is_empty());
    token
}

async fn create_article(app: &Router, token: &str, title: &str) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/articles",
        Some(token),
        Some(json!({ "title": title, "content": "Some content" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().expect("article id")
}

#[tokio::test]
async fn register_login_and_fetch_user() {
    let app = router(test_state());

    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/reg",
        None,
        Some(json!({ "username": "a", "email": "a@x.com", "password": "password1" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/log",
        None,
        Some(json!({ "email": "a@x.com", "password": "password1" })),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert!(!body.as_str().unwrap().is_empty());

    let (status, user) = send(&app, Method::GET, "/users/1", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["username"], "a");
    assert_eq!(user["email"], "a@x.com");
    // The hash must never be serialized outward.
    assert!(user.get("password").is_none());
    assert!(user.get("password_hash").is_none());
}

#[tokio::test]
async fn register_rejects_bad_payloads() {
    let app = router(test_state());

    for payload in [
        json!({ "username": "a", "email": "not-an-email", "password": "password1" }),
        json!({ "username": "a", "email": "a@x.com", "password": "short" }),
        json!({ "username": "", "email": "a@x.com", "password": "password1" }),
    ] {
        let (status, body) = send(&app, Method::POST, "/auth/reg", None, Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let app = router(test_state());
    register_and_login(&app, "dup").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/reg",
        None,
        Some(json!({ "username": "dup2", "email": "dup@example.com", "password": "password1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_failures_are_classified() {
    let app = router(test_state());
    register_and_login(&app, "carol").await;

    // Wrong password: 401
    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/log",
        None,
        Some(json!({ "email": "carol@example.com", "password": "password2" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Unknown account: 404
    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/log",
        None,
        Some(json!({ "email": "nobody@example.com", "password": "password1" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Invalid payload: 400
    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/log",
        None,
        Some(json!({ "email": "carol@example.com", "password": "short" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn protected_route_requires_a_token() {
    let app = router(test_state());

    let (status, body) = send(
        &app,
        Method::POST,
        "/articles",
        None,
        Some(json!({ "title": "T", "content": "C" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "authorization header is missing");
}

#[tokio::test]
async fn malformed_authorization_header_is_401() {
    let app = router(test_state());

    for value in ["Token abc", "Bearer a b", "bearer abc"] {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/articles")
            .header(header::AUTHORIZATION, value)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "title": "T", "content": "C" }).to_string()))
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "header {value:?}");
    }
}

#[tokio::test]
async fn garbage_and_expired_tokens_are_401() {
    let state = test_state();
    let app = router(state.clone());

    let (status, _) = send(
        &app,
        Method::POST,
        "/articles",
        Some("not-a-token"),
        Some(json!({ "title": "T", "content": "C" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Correctly signed, but the window has passed.
    let now = chrono::Utc::now().timestamp();
    let expired = state
        .tokens
        .generate(&Claims {
            sub: "1".to_string(),
            iat: now - 7200,
            nbf: now - 7200,
            exp: now - 3600,
            iss: "quill-test".to_string(),
            aud: "quill-test".to_string(),
        })
        .unwrap();

    let (status, _) = send(
        &app,
        Method::POST,
        "/articles",
        Some(&expired),
        Some(json!({ "title": "T", "content": "C" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_for_a_missing_user_is_401_not_404() {
    let state = test_state();
    let app = router(state.clone());

    // Valid signature, valid window, but no such user id.
    let token = state.tokens.issue(999).unwrap();

    let (status, _) = send(
        &app,
        Method::POST,
        "/articles",
        Some(&token),
        Some(json!({ "title": "T", "content": "C" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn article_creation_stamps_the_caller_as_author() {
    let app = router(test_state());
    let token = register_and_login(&app, "author").await;

    let (status, article) = send(
        &app,
        Method::POST,
        "/articles",
        Some(&token),
        Some(json!({ "title": "Hello", "content": "World" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(article["author_id"], 1);
    assert_eq!(article["likes"], 0);

    let id = article["id"].as_i64().unwrap();
    let (status, fetched) = send(&app, Method::GET, &format!("/articles/{id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["author"]["username"], "author");
    assert_eq!(fetched["author"]["id"], 1);
}

#[tokio::test]
async fn create_article_rejects_oversized_fields() {
    let app = router(test_state());
    let token = register_and_login(&app, "writer").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/articles",
        Some(&token),
        Some(json!({ "title": "t".repeat(101), "content": "C" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/articles",
        Some(&token),
        Some(json!({ "title": "T", "content": "c".repeat(1001) })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn only_the_owner_may_mutate_an_article() {
    let app = router(test_state());
    let owner = register_and_login(&app, "owner").await;
    let intruder = register_and_login(&app, "intruder").await;

    let id = create_article(&app, &owner, "Original title").await;

    // A different authenticated user is rejected and nothing changes.
    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/articles/{id}"),
        Some(&intruder),
        Some(json!({ "title": "Hijacked" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/articles/{id}"),
        Some(&intruder),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, article) = send(&app, Method::GET, &format!("/articles/{id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(article["title"], "Original title");

    // The owner's same requests succeed.
    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/articles/{id}"),
        Some(&owner),
        Some(json!({ "title": "Renamed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_i64().unwrap(), id);

    let (status, article) = send(&app, Method::GET, &format!("/articles/{id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(article["title"], "Renamed");
    assert_eq!(article["content"], "Some content");

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/articles/{id}"),
        Some(&owner),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, &format!("/articles/{id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn mutating_a_missing_article_is_404() {
    let app = router(test_state());
    let token = register_and_login(&app, "eve").await;

    let (status, _) = send(
        &app,
        Method::PATCH,
        "/articles/999",
        Some(&token),
        Some(json!({ "title": "X" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::GET, "/articles/abc", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn pagination_bounds_are_checked_before_data_access() {
    let app = router(test_state());

    for query in [
        "limit=0&offset=0",
        "limit=11&offset=0",
        "limit=5&offset=-1",
        "offset=0", // limit is required
    ] {
        let (status, _) = send(
            &app,
            Method::GET,
            &format!("/articles/author/1?{query}"),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "query {query:?}");
    }

    let (status, body) = send(
        &app,
        Method::GET,
        "/articles/author/1?limit=10&offset=0",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn comment_flow() {
    let app = router(test_state());
    let token = register_and_login(&app, "frank").await;

    // Commenting on a nonexistent article is a 404, not a silent success.
    let (status, _) = send(
        &app,
        Method::POST,
        "/articles/999/comments",
        Some(&token),
        Some(json!({ "text": "hello?" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Listing comments on a nonexistent article is also a 404...
    let (status, _) = send(
        &app,
        Method::GET,
        "/articles/999/comments?limit=10&offset=0",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // ...unless the pagination is invalid, which is rejected first.
    let (status, _) = send(
        &app,
        Method::GET,
        "/articles/999/comments?limit=99&offset=0",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let id = create_article(&app, &token, "Commented").await;

    let (status, comment_id) = send(
        &app,
        Method::POST,
        &format!("/articles/{id}/comments"),
        Some(&token),
        Some(json!({ "text": "first!" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(comment_id.as_i64().is_some());

    // Comments require auth to create, but are public to read.
    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/articles/{id}/comments"),
        None,
        Some(json!({ "text": "anon" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, comments) = send(
        &app,
        Method::GET,
        &format!("/articles/{id}/comments?limit=10&offset=0"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let comments = comments.as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["text"], "first!");
    assert_eq!(comments[0]["user_id"], 1);
}

#[tokio::test]
async fn likes_are_idempotent_and_counted() {
    let app = router(test_state());
    let token = register_and_login(&app, "grace").await;
    let id = create_article(&app, &token, "Likeable").await;

    let uri = format!("/articles/{id}/like");
    let (status, _) = send(&app, Method::POST, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(&app, Method::POST, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(&app, Method::POST, &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, article) = send(&app, Method::GET, &format!("/articles/{id}"), None, None).await;
    assert_eq!(article["likes"], 1);
}

#[tokio::test]
async fn latest_articles_lists_summaries() {
    let app = router(test_state());
    let token = register_and_login(&app, "henry").await;
    create_article(&app, &token, "One").await;
    create_article(&app, &token, "Two").await;

    let (status, body) = send(&app, Method::GET, "/articles", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 2);
    for item in list {
        assert_eq!(item["author_name"], "henry");
        assert!(item["id"].as_i64().is_some());
        assert!(item.get("content").is_none(), "summaries carry no body");
    }
}

#[tokio::test]
async fn articles_by_author_is_paginated() {
    let app = router(test_state());
    let token = register_and_login(&app, "iris").await;
    for i in 0..3 {
        create_article(&app, &token, &format!("Article {i}")).await;
    }

    let (status, body) = send(
        &app,
        Method::GET,
        "/articles/author/1?limit=2&offset=0",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, body) = send(
        &app,
        Method::GET,
        "/articles/author/1?limit=2&offset=2",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}
