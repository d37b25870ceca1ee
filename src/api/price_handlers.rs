use axum::{
    extract::{Path, State},
    Json,
};

use super::errors::ApiError;
use super::extractors::ApiKeyUser;
use super::responses::PriceResponse;
use super::state::AppState;

/// Live price data for a ticker
#[utoipa::path(
    get,
    path = "/prices/{ticker}",
    tag = "Prices",
    params(
        ("ticker" = String, Path, description = "Ticker symbol, e.g. AAPL"),
        ("api_key" = Option<String>, Query, description = "API key (or send it as a Bearer token)")
    ),
    responses(
        (status = 200, description = "Latest quote", body = PriceResponse),
        (status = 400, description = "Unknown symbol or unusable quote", body = ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = ErrorResponse),
        (status = 502, description = "Market data provider unavailable", body = ErrorResponse)
    )
)]
pub async fn get_prices(
    _caller: ApiKeyUser,
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<PriceResponse>, ApiError> {
    let quote = state.market_data.quote(&ticker).await?;
    Ok(Json(PriceResponse::new(quote)))
}
