use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use axum_extra::extract::cookie::CookieJar;

use crate::auth::AuthError;
use crate::database::DatabaseError;
use crate::models::{normalize_email, NewUser, UserProfile};

use super::errors::ApiError;
use super::extractors::{clear_session_cookie, session_cookie, AuthenticatedUser};
use super::responses::{LoginRequest, MessageResponse, SignupRequest, UserResponse};
use super::state::AppState;

fn validate_signup(request: &SignupRequest) -> Result<(), ApiError> {
    if request.name.trim().is_empty() {
        return Err(ApiError::Unprocessable("name must not be empty".into()));
    }
    let email = request.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::Unprocessable("email is not a valid address".into()));
    }
    if request.password.is_empty() {
        return Err(ApiError::Unprocessable("password must not be empty".into()));
    }
    Ok(())
}

/// Create an account and start a session
#[utoipa::path(
    post,
    path = "/auth/signup",
    tag = "Auth",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "User created, session cookie set", body = UserResponse),
        (status = 400, description = "User already exists", body = ErrorResponse),
        (status = 422, description = "Invalid signup payload", body = ErrorResponse)
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    validate_signup(&request)?;

    let email = normalize_email(&request.email);
    if state.users.find_by_email(&email)?.is_some() {
        return Err(ApiError::BadRequest("User already exists".into()));
    }

    let password_hash = state.auth.hash_password(&request.password)?;
    let user = state
        .users
        .insert(NewUser::new(request.name.trim().to_string(), email, password_hash))
        .map_err(|e| match e {
            DatabaseError::Conflict(_) => ApiError::BadRequest("User already exists".into()),
            other => ApiError::from(other),
        })?;

    let token = state.auth.issue_token(&user.email)?;
    tracing::info!("New user signed up: {}", user.email);

    Ok((
        jar.add(session_cookie(token, state.auth.token_ttl(), state.cookie_secure)),
        Json(UserResponse::new(UserProfile::from(&user))),
    ))
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in, session cookie set", body = UserResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let email = normalize_email(&request.email);

    let user = state
        .users
        .find_by_email(&email)?
        .ok_or(AuthError::InvalidCredentials)?;

    if let Err(e) = state.auth.verify_password(&request.password, &user.password_hash) {
        tracing::debug!("Failed login for {}: {}", email, e);
        return Err(e.into());
    }

    let token = state.auth.issue_token(&user.email)?;

    Ok((
        jar.add(session_cookie(token, state.auth.token_ttl(), state.cookie_secure)),
        Json(UserResponse::new(UserProfile::from(&user))),
    ))
}

/// Clear the session cookie
#[utoipa::path(
    get,
    path = "/auth/logout",
    tag = "Auth",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse)
    )
)]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    (
        jar.add(clear_session_cookie(state.cookie_secure)),
        Json(MessageResponse::new("Logged out successfully")),
    )
}

/// Return the user behind the current session
#[utoipa::path(
    get,
    path = "/auth/check-auth",
    tag = "Auth",
    responses(
        (status = 200, description = "Session is valid", body = UserResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub async fn check_auth(AuthenticatedUser(user): AuthenticatedUser) -> Json<UserResponse> {
    Json(UserResponse::new(UserProfile::from(&user)))
}
