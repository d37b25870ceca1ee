use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::{Client, Response, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::PriceQuote;

use super::provider::{MarketDataError, MarketDataProvider};

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Page that hands out the session cookie the crumb is bound to
pub const DEFAULT_SESSION_URL: &str = "https://fc.yahoo.com";

const REFERER: &str = "https://finance.yahoo.com/";

/// Quote adapter for a Yahoo-Finance-compatible `/v7/finance/quote` endpoint.
///
/// The endpoint rejects anonymous calls, so the adapter first collects a
/// session cookie (kept in the client's cookie jar), then fetches a crumb from
/// `/v1/test/getcrumb` and appends it to every quote request. The crumb is
/// cached until upstream answers 401/403, which triggers one refresh and retry.
pub struct YahooQuoteProvider {
    client: Client,
    base_url: String,
    session_url: String,
    crumb: RwLock<Option<String>>,
}

impl YahooQuoteProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, MarketDataError> {
        let client = Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .user_agent(concat!("ticker-api/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MarketDataError::Unavailable(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session_url: DEFAULT_SESSION_URL.to_string(),
            crumb: RwLock::new(None),
        })
    }

    pub fn with_session_url(mut self, session_url: impl Into<String>) -> Self {
        self.session_url = session_url.into();
        self
    }

    fn quote_url(&self) -> String {
        format!("{}/v7/finance/quote", self.base_url)
    }

    fn crumb_url(&self) -> String {
        format!("{}/v1/test/getcrumb", self.base_url)
    }

    /// Cached crumb, or a fresh one from upstream
    async fn crumb(&self) -> Result<String, MarketDataError> {
        let cached = self.crumb.read().clone();
        if let Some(crumb) = cached {
            return Ok(crumb);
        }
        self.refresh_crumb().await
    }

    async fn refresh_crumb(&self) -> Result<String, MarketDataError> {
        *self.crumb.write() = None;

        // Only the cookie matters; the page itself is usually a 404
        self.client
            .get(&self.session_url)
            .header(reqwest::header::REFERER, REFERER)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Yahoo session cookie request failed: {}", e);
                MarketDataError::Unavailable(format!("session cookie: {e}"))
            })?;

        let response = self
            .client
            .get(self.crumb_url())
            .header(reqwest::header::REFERER, REFERER)
            .send()
            .await
            .map_err(|e| MarketDataError::Unavailable(format!("crumb: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Crumb endpoint returned {}", status);
            return Err(MarketDataError::Unavailable(format!("crumb status {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| MarketDataError::Unavailable(format!("crumb: {e}")))?;
        let crumb = parse_crumb(&body)
            .ok_or_else(|| MarketDataError::Unavailable("crumb endpoint returned no crumb".into()))?;

        tracing::debug!("Obtained Yahoo crumb");
        *self.crumb.write() = Some(crumb.clone());
        Ok(crumb)
    }

    async fn send_quote(&self, ticker: &str, crumb: &str) -> Result<Response, MarketDataError> {
        self.client
            .get(self.quote_url())
            .query(&[("symbols", ticker), ("crumb", crumb)])
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Quote request for {} failed: {}", ticker, e);
                MarketDataError::Unavailable(e.to_string())
            })
    }
}

fn is_auth_rejection(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

/// A usable crumb is a short token; HTML and rate-limit pages are not
fn parse_crumb(body: &str) -> Option<String> {
    let crumb = body.trim();
    let usable = !crumb.is_empty()
        && crumb.len() < 100
        && !crumb.contains(char::is_whitespace)
        && !crumb.contains('<');
    usable.then(|| crumb.to_string())
}

#[async_trait]
impl MarketDataProvider for YahooQuoteProvider {
    async fn quote(&self, ticker: &str) -> Result<PriceQuote, MarketDataError> {
        let crumb = self.crumb().await?;
        let mut response = self.send_quote(ticker, &crumb).await?;

        if is_auth_rejection(response.status()) {
            tracing::debug!("Crumb rejected ({}), refreshing", response.status());
            let crumb = self.refresh_crumb().await?;
            response = self.send_quote(ticker, &crumb).await?;
        }

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(MarketDataError::NotFound(ticker.to_string()));
        }
        if !status.is_success() {
            tracing::warn!("Quote provider returned {} for {}", status, ticker);
            return Err(MarketDataError::Unavailable(format!("upstream status {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| MarketDataError::Unavailable(e.to_string()))?;

        parse_quote_response(ticker, &body)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteEnvelope {
    quote_response: QuoteResponse,
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    #[serde(default)]
    result: Vec<QuotePayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuotePayload {
    symbol: String,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    regular_market_price: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    regular_market_change: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    regular_market_change_percent: Option<Decimal>,
    #[serde(default)]
    regular_market_volume: Option<f64>,
    #[serde(default)]
    average_daily_volume3_month: Option<f64>,
}

/// Extract the quote for `ticker` from a quote endpoint body.
///
/// Symbols compare case-insensitively. A missing price is malformed; missing
/// change or volume fields read as zero.
pub fn parse_quote_response(ticker: &str, body: &str) -> Result<PriceQuote, MarketDataError> {
    let envelope: QuoteEnvelope =
        serde_json::from_str(body).map_err(|e| MarketDataError::Malformed(e.to_string()))?;

    let payload = envelope
        .quote_response
        .result
        .into_iter()
        .find(|q| q.symbol.eq_ignore_ascii_case(ticker))
        .ok_or_else(|| MarketDataError::NotFound(ticker.to_string()))?;

    let price = payload
        .regular_market_price
        .ok_or_else(|| MarketDataError::Malformed(format!("{} has no market price", ticker)))?;

    Ok(PriceQuote {
        price,
        price_change: payload.regular_market_change.unwrap_or_default(),
        price_change_percent: payload.regular_market_change_percent.unwrap_or_default(),
        volume: to_volume(payload.regular_market_volume),
        avg_volume: to_volume(payload.average_daily_volume3_month),
    })
}

fn to_volume(value: Option<f64>) -> u64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v.round() as u64,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const AAPL: &str = r#"{
        "quoteResponse": {
            "result": [{
                "symbol": "AAPL",
                "regularMarketPrice": 189.5,
                "regularMarketChange": -1.25,
                "regularMarketChangePercent": -0.5,
                "regularMarketVolume": 51234567,
                "averageDailyVolume3Month": 60000000
            }],
            "error": null
        }
    }"#;

    #[test]
    fn test_parse_quote() {
        let quote = parse_quote_response("aapl", AAPL).unwrap();
        assert_eq!(quote.price, dec!(189.5));
        assert_eq!(quote.price_change, dec!(-1.25));
        assert_eq!(quote.price_change_percent, dec!(-0.5));
        assert_eq!(quote.volume, 51_234_567);
        assert_eq!(quote.avg_volume, 60_000_000);
    }

    #[test]
    fn test_unknown_symbol() {
        let body = r#"{"quoteResponse":{"result":[],"error":null}}"#;
        assert!(matches!(
            parse_quote_response("ZZZZ", body),
            Err(MarketDataError::NotFound(ref s)) if s == "ZZZZ"
        ));
    }

    #[test]
    fn test_missing_price_is_malformed() {
        let body = r#"{"quoteResponse":{"result":[{"symbol":"X"}]}}"#;
        assert!(matches!(
            parse_quote_response("X", body),
            Err(MarketDataError::Malformed(_))
        ));
    }

    #[test]
    fn test_garbage_body_is_malformed() {
        assert!(matches!(
            parse_quote_response("X", "<html>rate limited</html>"),
            Err(MarketDataError::Malformed(_))
        ));
    }

    #[test]
    fn test_missing_volumes_default_to_zero() {
        let body = r#"{"quoteResponse":{"result":[{"symbol":"^DJI","regularMarketPrice":39000.25}]}}"#;
        let quote = parse_quote_response("^DJI", body).unwrap();
        assert_eq!(quote.volume, 0);
        assert_eq!(quote.avg_volume, 0);
        assert_eq!(quote.price_change, Decimal::ZERO);
    }

    #[test]
    fn test_provider_trims_base_url() {
        let provider =
            YahooQuoteProvider::new("http://localhost:9999/", Duration::from_secs(1)).unwrap();
        assert_eq!(provider.quote_url(), "http://localhost:9999/v7/finance/quote");
        assert_eq!(provider.crumb_url(), "http://localhost:9999/v1/test/getcrumb");
    }

    #[test]
    fn test_parse_crumb() {
        assert_eq!(parse_crumb("abc.DEF/12\n").as_deref(), Some("abc.DEF/12"));
        assert!(parse_crumb("").is_none());
        assert!(parse_crumb("Too Many Requests").is_none());
        assert!(parse_crumb("<html><body>denied</body></html>").is_none());
        assert!(parse_crumb(&"x".repeat(120)).is_none());
    }

    /// Upstream stand-in: quotes need the current crumb, crumbs are counted
    mod upstream {
        use std::collections::HashMap;
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        use axum::{
            extract::{Query, State},
            http::{header::SET_COOKIE, StatusCode},
            response::IntoResponse,
            routing::get,
            Router,
        };

        pub const CRUMB: &str = "fresh-crumb";

        #[derive(Clone, Default)]
        pub struct Calls {
            pub crumbs: Arc<AtomicUsize>,
            pub quotes: Arc<AtomicUsize>,
        }

        async fn session() -> impl IntoResponse {
            (StatusCode::NOT_FOUND, [(SET_COOKIE, "A3=session; Path=/")])
        }

        async fn crumb(State(calls): State<Calls>) -> &'static str {
            calls.crumbs.fetch_add(1, Ordering::SeqCst);
            CRUMB
        }

        async fn quote(
            State(calls): State<Calls>,
            Query(params): Query<HashMap<String, String>>,
        ) -> impl IntoResponse {
            calls.quotes.fetch_add(1, Ordering::SeqCst);
            if params.get("crumb").map(String::as_str) != Some(CRUMB) {
                return (StatusCode::UNAUTHORIZED, "Invalid Crumb".to_string());
            }
            (StatusCode::OK, super::AAPL.to_string())
        }

        /// Serve on an ephemeral loopback port, returning its base URL
        pub async fn spawn(calls: Calls) -> String {
            let router = Router::new()
                .route("/session", get(session))
                .route("/v1/test/getcrumb", get(crumb))
                .route("/v7/finance/quote", get(quote))
                .with_state(calls);

            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, router).await.unwrap();
            });
            format!("http://{}", addr)
        }
    }

    fn provider_for(base_url: &str) -> YahooQuoteProvider {
        YahooQuoteProvider::new(base_url, Duration::from_secs(5))
            .unwrap()
            .with_session_url(format!("{}/session", base_url))
    }

    #[tokio::test]
    async fn test_quote_fetches_crumb_once_and_caches_it() {
        use std::sync::atomic::Ordering;

        let calls = upstream::Calls::default();
        let base_url = upstream::spawn(calls.clone()).await;
        let provider = provider_for(&base_url);

        let quote = provider.quote("AAPL").await.unwrap();
        assert_eq!(quote.price, dec!(189.5));
        provider.quote("AAPL").await.unwrap();

        assert_eq!(calls.crumbs.load(Ordering::SeqCst), 1);
        assert_eq!(calls.quotes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_rejected_crumb_is_refreshed_and_retried_once() {
        use std::sync::atomic::Ordering;

        let calls = upstream::Calls::default();
        let base_url = upstream::spawn(calls.clone()).await;
        let provider = provider_for(&base_url);
        *provider.crumb.write() = Some("stale-crumb".to_string());

        let quote = provider.quote("AAPL").await.unwrap();
        assert_eq!(quote.volume, 51_234_567);
        assert_eq!(calls.crumbs.load(Ordering::SeqCst), 1);
        assert_eq!(calls.quotes.load(Ordering::SeqCst), 2);
        assert_eq!(provider.crumb.read().as_deref(), Some(upstream::CRUMB));
    }
}
