use async_trait::async_trait;
use thiserror::Error;

use crate::models::PriceQuote;

#[derive(Debug, Error)]
pub enum MarketDataError {
    /// Upstream knows nothing about the symbol
    #[error("No quote found for symbol: {0}")]
    NotFound(String),

    /// Upstream answered but the payload could not be used
    #[error("Malformed quote response: {0}")]
    Malformed(String),

    /// Transport failure or non-success status
    #[error("Market data provider unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn quote(&self, ticker: &str) -> Result<PriceQuote, MarketDataError>;
}
