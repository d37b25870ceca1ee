use axum::{extract::State, Json};

use crate::auth::generate_api_key;
use crate::models::UserProfile;

use super::errors::ApiError;
use super::extractors::{ApiKeyUser, AuthenticatedUser};
use super::responses::{ApiKeyResponse, MessageResponse, UserResponse};
use super::state::AppState;

/// Current user's profile
#[utoipa::path(
    get,
    path = "/user",
    tag = "User",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub async fn get_user(AuthenticatedUser(user): AuthenticatedUser) -> Json<UserResponse> {
    Json(UserResponse::new(UserProfile::from(&user)))
}

/// Issue a new API key, replacing any existing one
#[utoipa::path(
    put,
    path = "/user/generate-apikey",
    tag = "User",
    responses(
        (status = 200, description = "New API key", body = ApiKeyResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub async fn generate_user_api_key(
    AuthenticatedUser(user): AuthenticatedUser,
    State(state): State<AppState>,
) -> Result<Json<ApiKeyResponse>, ApiError> {
    let api_key = generate_api_key();

    state
        .users
        .set_api_key(&user.email, Some(api_key.clone()))?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    tracing::info!("Issued API key for {}", user.email);
    Ok(Json(ApiKeyResponse::new(api_key)))
}

/// Revoke the current API key
#[utoipa::path(
    delete,
    path = "/user/delete-apikey",
    tag = "User",
    responses(
        (status = 200, description = "API key deleted", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub async fn delete_user_api_key(
    AuthenticatedUser(user): AuthenticatedUser,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .users
        .set_api_key(&user.email, None)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    Ok(Json(MessageResponse::new("API key deleted successfully")))
}

/// Check that an API key is valid
#[utoipa::path(
    get,
    path = "/user/verify-apikey",
    tag = "User",
    params(
        ("api_key" = Option<String>, Query, description = "API key (or send it as a Bearer token)")
    ),
    responses(
        (status = 200, description = "API key is valid", body = MessageResponse),
        (status = 401, description = "Missing or invalid API key", body = ErrorResponse)
    )
)]
pub async fn verify_user_api_key(_caller: ApiKeyUser) -> Json<MessageResponse> {
    Json(MessageResponse::new("API key verified"))
}
