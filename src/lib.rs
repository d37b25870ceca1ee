// Library Crate Root
// lib.rs

// main.rs and the integration tests reach everything through these modules
pub mod api;
pub mod auth;
pub mod config;
pub mod database;
pub mod engine;
pub mod market_data;
pub mod models;

// pub use = re-export at crate root
pub use api::{create_router, ApiError, AppState};
pub use auth::AuthService;
pub use config::Config;
pub use engine::{TickerEngine, TickerError};
pub use models::{IndexRecord, Market, SortOrder, SortSpec, StockRecord, TickerRecord};
