use std::time::Duration;

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;

use crate::auth::AuthError;
use crate::models::User;

use super::errors::ApiError;
use super::state::AppState;

/// Name of the session cookie carrying the JWT
pub const SESSION_COOKIE: &str = "token";

/// User resolved from a session token (Bearer header or `token` cookie)
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

/// User owning the API key presented with the request
#[derive(Debug, Clone)]
pub struct ApiKeyUser(pub User);

#[derive(Debug, Default, Deserialize)]
struct ApiKeyQuery {
    api_key: Option<String>,
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
}

fn session_token(headers: &HeaderMap) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().trim().to_string())
        .filter(|token| !token.is_empty())
}

/// Session cookie carrying `token` for `ttl`
pub fn session_cookie(token: String, ttl: Duration, secure: bool) -> Cookie<'static> {
    let max_age = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::seconds(max_age))
        .secure(secure)
        .build()
}

/// Session cookie that makes the browser drop the session
pub fn clear_session_cookie(secure: bool) -> Cookie<'static> {
    let mut cookie = session_cookie(String::new(), Duration::ZERO, secure);
    cookie.make_removal();
    cookie
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .or_else(|| session_token(&parts.headers))
            .ok_or_else(|| AuthError::Unauthorized("No token provided".into()))?;

        let email = state.auth.validate_token(&token).map_err(|e| {
            tracing::debug!("Rejected session token: {}", e);
            e
        })?;

        let user = state
            .users
            .find_by_email(&email)?
            .ok_or_else(|| AuthError::Unauthorized("User not found".into()))?;

        Ok(AuthenticatedUser(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for ApiKeyUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let from_query = Query::<ApiKeyQuery>::try_from_uri(&parts.uri)
            .map(|Query(q)| q.api_key)
            .unwrap_or_default()
            .filter(|key| !key.is_empty());

        let api_key = match from_query {
            Some(key) => key,
            None => {
                if !parts.headers.contains_key(AUTHORIZATION) {
                    return Err(AuthError::Unauthorized("No API key provided".into()).into());
                }
                bearer_token(&parts.headers)
                    .map(str::to_string)
                    .ok_or_else(|| AuthError::Unauthorized("Invalid API key".into()))?
            }
        };

        match state.users.find_by_api_key(&api_key)? {
            Some(user) => Ok(ApiKeyUser(user)),
            None => {
                tracing::warn!("Rejected unknown API key");
                Err(AuthError::Unauthorized("Invalid API key".into()).into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::COOKIE, HeaderValue};

    #[test]
    fn test_session_token_from_cookie_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_token(&headers), None);

        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; token=abc.def.ghi"));
        assert_eq!(session_token(&headers).as_deref(), Some("abc.def.ghi"));

        headers.insert(COOKIE, HeaderValue::from_static("token=; theme=dark"));
        assert_eq!(session_token(&headers), None);
    }

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));
        assert_eq!(bearer_token(&headers), Some("xyz"));
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("jwt".into(), Duration::from_secs(3600), false);
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "jwt");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::hours(1)));
        assert_ne!(cookie.secure(), Some(true));

        let cookie = clear_session_cookie(true);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
        assert_eq!(cookie.secure(), Some(true));
        assert!(cookie.to_string().starts_with("token=;"));
    }
}
