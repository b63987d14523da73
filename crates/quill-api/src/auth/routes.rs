// Registration and login HTTP routes

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::ToSchema;

use quill_storage::password::{hash_password, verify_password};
use quill_storage::CreateUser;

use crate::api::error::ApiError;
use crate::AppState;

/// Register request
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Create auth routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/auth/reg", post(register))
        .route("/auth/log", post(login))
        .with_state(state)
}

/// POST /auth/reg - Register a new user
#[utoipa::path(
    post,
    path = "/auth/reg",
    request_body = RegisterRequest,
    responses(
        (status = 204, description = "User registered"),
        (status = 400, description = "Validation failure or email already registered"),
        (status = 500, description = "Internal server error")
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .validator
        .register(&req.username, &req.email, &req.password)?;

    let existing = state.db.get_user_by_email(&req.email).await?;
    if existing.is_some() {
        return Err(ApiError::bad_request("email is already registered"));
    }

    let password_hash = hash_password(&req.password)?;

    let user = state
        .db
        .create_user(CreateUser {
            username: req.username,
            email: req.email,
            password_hash,
        })
        .await?;

    tracing::debug!(user_id = user.id, "user registered");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /auth/log - Login with email and password
///
/// Returns the signed token as a JSON string. Clients send it back in the
/// `Authorization: Bearer <token>` header.
#[utoipa::path(
    post,
    path = "/auth/log",
    request_body = LoginRequest,
    responses(
        (status = 202, description = "Login accepted, body is the token string", body = String),
        (status = 400, description = "Validation failure"),
        (status = 401, description = "Wrong password"),
        (status = 404, description = "No account for this email"),
        (status = 500, description = "Internal server error")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<(StatusCode, Json<String>), ApiError> {
    state.validator.login(&req.email, &req.password)?;

    let user = state
        .db
        .get_user_by_email(&req.email)
        .await?
        .ok_or_else(|| ApiError::not_found("no account for this email"))?;

    let valid = verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::unauthorized("invalid credentials"));
    }

    let token = state.tokens.issue(user.id)?;

    Ok((StatusCode::ACCEPTED, Json(token)))
}
