//! Error types for ticker queries

use thiserror::Error;

use crate::database::DatabaseError;

/// Errors that can occur while paging or looking up tickers
///
/// # Error Categories
///
/// - **Client Errors**: `InvalidRequest`, `InvalidPage`, `NotFound`
/// - **Server Errors**: `CollaboratorUnavailable`
#[derive(Debug, Error)]
pub enum TickerError {
    /// Page or limit outside the accepted range
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Requested page lies beyond the last page
    #[error("Page number exceeds total pages")]
    InvalidPage { page: u64, total_pages: u64 },

    /// Ticker is in neither collection
    #[error("Ticker not found: {0}")]
    NotFound(String),

    /// A backing store query failed; the whole request is aborted
    #[error("Ticker store unavailable: {0}")]
    CollaboratorUnavailable(#[from] DatabaseError),
}
