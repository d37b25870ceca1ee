#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, Response},
    Router,
};
use rust_decimal_macros::dec;
use serde_json::Value;
use ticker_api::database::repositories::{
    InMemoryTickerStore, InMemoryUserRepository, UserRepository,
};
use ticker_api::database::Collection;
use ticker_api::market_data::{MarketDataError, MarketDataProvider};
use ticker_api::models::{NewUser, PriceQuote};
use ticker_api::{create_router, AppState, AuthService, IndexRecord, StockRecord, TickerEngine};
use tower::ServiceExt;

pub const API_KEY: &str = "testkey0123456789testkey0123456789abcdef";
pub const SECRET: &[u8] = b"integration-test-secret-32-bytes";

/// Quotes for AAPL, upstream outage for DOWN, unknown otherwise
pub struct StubProvider;

#[async_trait]
impl MarketDataProvider for StubProvider {
    async fn quote(&self, ticker: &str) -> Result<PriceQuote, MarketDataError> {
        match ticker {
            "AAPL" => Ok(PriceQuote {
                price: dec!(189.5),
                price_change: dec!(-1.25),
                price_change_percent: dec!(-0.5),
                volume: 1_000,
                avg_volume: 2_000,
            }),
            "DOWN" => Err(MarketDataError::Unavailable("connection refused".into())),
            other => Err(MarketDataError::NotFound(other.to_string())),
        }
    }
}

pub struct TestApp {
    pub router: Router,
    pub users: InMemoryUserRepository,
    pub auth: Arc<AuthService>,
}

/// App with `stocks` stocks (S01..) and `indices` indices (I01..), plus a
/// user `jane@example.com` holding `API_KEY`
pub fn test_app(stocks: usize, indices: usize) -> TestApp {
    let stock_store = InMemoryTickerStore::with_records(
        Collection::Stocks,
        (1..=stocks).map(|i| {
            StockRecord::new(format!("S{:02}", i))
                .with_company_name(format!("Stock {}", i))
                .with_market_cap(i as u64 * 1_000)
        }),
    );
    let index_store = InMemoryTickerStore::with_records(
        Collection::Indices,
        (1..=indices).map(|i| IndexRecord::new(format!("I{:02}", i)).with_name(format!("Index {}", i))),
    );

    let users = InMemoryUserRepository::new();
    let auth = Arc::new(AuthService::new(SECRET, Duration::from_secs(3600)));

    let hash = auth.hash_password("password123").unwrap();
    users
        .insert(NewUser::new("Jane".into(), "jane@example.com".into(), hash))
        .unwrap();
    users
        .set_api_key("jane@example.com", Some(API_KEY.to_string()))
        .unwrap();

    let state = AppState {
        engine: Arc::new(TickerEngine::new(Arc::new(stock_store), Arc::new(index_store))),
        users: Arc::new(users.clone()),
        auth: auth.clone(),
        market_data: Arc::new(StubProvider),
        cookie_secure: false,
        storage: "memory",
    };

    TestApp {
        router: create_router(state, &["*".to_string()]),
        users,
        auth,
    }
}

pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router.clone().oneshot(request).await.unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_with_bearer(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
