//! Account directory handlers: registration, login and account lookup.

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use validator::Validate;

use crate::api::error::ApiError;
use crate::api::extract::{ApiJson, ApiPath};
use crate::api::routes::UserApiState;
use crate::auth::{AdminBootstrap, AuthContext, TokenResponse};
use crate::domain::{Account, AccountId};
use crate::errors::Error;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 255, message = "Username must be 1-255 characters"))]
    pub username: String,
    #[validate(contains(pattern = "@", message = "Email must contain '@'"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerifyResponse {
    pub valid: bool,
    pub user: Account,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateAdminResponse {
    pub message: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AccountId>,
}

#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn register_handler(
    State(state): State<UserApiState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<Json<Account>, ApiError> {
    payload.validate().map_err(Error::from)?;

    let account = state.users.register(&payload.username, &payload.email, &payload.password).await?;
    Ok(Json(account))
}

#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn login_handler(
    State(state): State<UserApiState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = state.login.login(&payload.username, &payload.password).await?;
    Ok(Json(token))
}

#[instrument(skip(state), fields(account_id = %id))]
pub async fn get_user_handler(
    State(state): State<UserApiState>,
    ApiPath(id): ApiPath<AccountId>,
) -> Result<Json<Account>, ApiError> {
    Ok(Json(state.users.get_user(id).await?))
}

/// Confirms the bearer token and returns the account it belongs to.
#[instrument(skip(state, context), fields(account_id = %context.user_id))]
pub async fn verify_handler(
    State(state): State<UserApiState>,
    Extension(context): Extension<AuthContext>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let user = state.users.get_user(context.user_id).await?;
    Ok(Json(VerifyResponse { valid: true, user }))
}

pub async fn list_users_handler(
    State(state): State<UserApiState>,
) -> Result<Json<Vec<Account>>, ApiError> {
    Ok(Json(state.users.list_users().await?))
}

/// Bootstrap the admin account. The configured password is never part of the response.
#[instrument(skip(state))]
pub async fn create_admin_handler(
    State(state): State<UserApiState>,
) -> Result<Json<CreateAdminResponse>, ApiError> {
    match state.users.create_admin().await? {
        AdminBootstrap::Created(account) => Ok(Json(CreateAdminResponse {
            message: "Admin user created".to_string(),
            username: account.username,
            id: Some(account.id),
        })),
        AdminBootstrap::AlreadyExists { username } => Ok(Json(CreateAdminResponse {
            message: "Admin user already exists".to_string(),
            username,
            id: None,
        })),
        AdminBootstrap::NotConfigured => {
            Err(ApiError::service_unavailable("Admin password is not configured"))
        }
    }
}
