use std::sync::Arc;

use crate::auth::AuthService;
use crate::database::repositories::UserRepository;
use crate::engine::TickerEngine;
use crate::market_data::MarketDataProvider;

/// Shared state for all API handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<TickerEngine>,
    pub users: Arc<dyn UserRepository>,
    pub auth: Arc<AuthService>,
    pub market_data: Arc<dyn MarketDataProvider>,
    /// Add `Secure` to the session cookie
    pub cookie_secure: bool,
    /// `postgres` or `memory`, reported by the health check
    pub storage: &'static str,
}
