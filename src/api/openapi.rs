use utoipa::OpenApi;

use crate::api::responses::*;
use crate::api::{auth_handlers, handlers, price_handlers, ticker_handlers, user_handlers};
use crate::engine::PageMeta;
use crate::models::{Market, PriceQuote, SortOrder, UserProfile};

/// OpenAPI specification
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Ticker API",
        version = "1.0.0",
        description = "Paginated stock and index ticker data with API-key access",
        license(
            name = "MIT"
        )
    ),
    paths(
        handlers::health_check,
        auth_handlers::signup,
        auth_handlers::login,
        auth_handlers::logout,
        auth_handlers::check_auth,
        user_handlers::get_user,
        user_handlers::generate_user_api_key,
        user_handlers::delete_user_api_key,
        user_handlers::verify_user_api_key,
        ticker_handlers::get_tickers,
        ticker_handlers::get_ticker,
        price_handlers::get_prices,
    ),
    components(
        schemas(
            Market,
            SortOrder,
            PageMeta,
            PriceQuote,
            UserProfile,
            TickerListResponse,
            TickerResponse,
            PriceResponse,
            UserResponse,
            ApiKeyData,
            ApiKeyResponse,
            MessageResponse,
            ErrorResponse,
            HealthResponse,
            SignupRequest,
            LoginRequest,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Auth", description = "Signup, login and session endpoints"),
        (name = "User", description = "Account and API key management"),
        (name = "Tickers", description = "Stock and index ticker data"),
        (name = "Prices", description = "Live price data"),
    )
)]
pub struct ApiDoc;
