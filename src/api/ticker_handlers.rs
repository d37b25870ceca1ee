use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};

use crate::engine::{shape_record, storage_field_name, PageRequest, DEFAULT_LIMIT, DEFAULT_PAGE};
use crate::models::{Market, SortOrder, SortSpec};

use super::errors::ApiError;
use super::extractors::ApiKeyUser;
use super::responses::{TickerListResponse, TickerQuery, TickerResponse};
use super::state::AppState;

/// Negative values become 0 so validation reports them
fn to_count(value: Option<i64>, default: u64) -> u64 {
    value.map_or(default, |v| u64::try_from(v).unwrap_or(0))
}

/// Turn raw query parameters into a validated page request
pub fn page_request_from_query(query: TickerQuery) -> Result<PageRequest, ApiError> {
    let sort_field = query
        .sort_by
        .as_deref()
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(|field| storage_field_name(field).to_string());

    let request = PageRequest::new(
        Market::from_query(query.market.as_deref()),
        to_count(query.page, DEFAULT_PAGE),
        to_count(query.limit, DEFAULT_LIMIT),
        SortSpec::new(sort_field, SortOrder::from_query(query.order.as_deref())),
    )?;

    Ok(request)
}

/// List tickers, paginated across stocks and indices
#[utoipa::path(
    get,
    path = "/tickers",
    tag = "Tickers",
    params(
        TickerQuery,
        ("api_key" = Option<String>, Query, description = "API key (or send it as a Bearer token)")
    ),
    responses(
        (status = 200, description = "Page of tickers", body = TickerListResponse),
        (status = 400, description = "Page number exceeds total pages", body = ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = ErrorResponse),
        (status = 422, description = "Invalid page or limit", body = ErrorResponse),
        (status = 500, description = "Ticker store unavailable", body = ErrorResponse)
    )
)]
pub async fn get_tickers(
    _caller: ApiKeyUser,
    State(state): State<AppState>,
    query: Result<Query<TickerQuery>, QueryRejection>,
) -> Result<Json<TickerListResponse>, ApiError> {
    let Query(query) = query?;
    let request = page_request_from_query(query)?;

    let page = state.engine.get_page(&request)?;
    let data = page.items.iter().map(shape_record).collect();

    Ok(Json(TickerListResponse::new(data, page.meta)))
}

/// Get a single stock or index by ticker symbol
#[utoipa::path(
    get,
    path = "/tickers/{ticker}",
    tag = "Tickers",
    params(
        ("ticker" = String, Path, description = "Ticker symbol, e.g. AAPL or ^DJI")
    ),
    responses(
        (status = 200, description = "Ticker details", body = TickerResponse),
        (status = 404, description = "Ticker not found", body = ErrorResponse),
        (status = 500, description = "Ticker store unavailable", body = ErrorResponse)
    )
)]
pub async fn get_ticker(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<TickerResponse>, ApiError> {
    let record = state.engine.get_by_ticker(&ticker)?;
    Ok(Json(TickerResponse::new(shape_record(&record))))
}
