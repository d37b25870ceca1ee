/// Market data module
///
/// Live price lookups for a single ticker. `MarketDataProvider` is the seam;
/// `YahooQuoteProvider` is the default HTTP adapter.

pub mod provider;
pub mod yahoo;

pub use provider::{MarketDataError, MarketDataProvider};
pub use yahoo::YahooQuoteProvider;
