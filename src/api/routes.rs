use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::auth_handlers::{check_auth, login, logout, signup};
use super::handlers::health_check;
use super::openapi::ApiDoc;
use super::price_handlers::get_prices;
use super::state::AppState;
use super::ticker_handlers::{get_ticker, get_tickers};
use super::user_handlers::{
    delete_user_api_key, generate_user_api_key, get_user, verify_user_api_key,
};

/// CORS policy: `*` allows any origin without credentials, an explicit list
/// allows those origins with cookies
pub fn cors_layer(allowed: &[String]) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::PUT, Method::DELETE];

    if allowed.is_empty() || allowed.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = allowed
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true)
}

/// Create the API router with Swagger UI
pub fn create_router(state: AppState, cors_allow: &[String]) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(health_check))
        // Session endpoints
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/logout", get(logout))
        .route("/auth/check-auth", get(check_auth))
        // Account and API key endpoints
        .route("/user", get(get_user))
        .route("/user/generate-apikey", put(generate_user_api_key))
        .route("/user/delete-apikey", delete(delete_user_api_key))
        .route("/user/verify-apikey", get(verify_user_api_key))
        // Ticker data
        .route("/tickers", get(get_tickers))
        .route("/tickers/:ticker", get(get_ticker))
        .route("/prices/:ticker", get(get_prices))
        .layer(cors_layer(cors_allow))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
