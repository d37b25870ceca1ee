//! Ticker Engine Module
//!
//! This module contains the ticker query core:
//! - `errors` - Error types for ticker queries
//! - `pagination` - Page validation and the stocks/indices split
//! - `shaping` - Storage document to public object conversion
//! - `ticker_engine` - Paging and lookup across both collections

pub mod errors;
pub mod pagination;
pub mod shaping;
pub mod ticker_engine;

// Re-export commonly used types for convenience
pub use errors::TickerError;
pub use pagination::{
    plan_merged_page, total_pages, MergePlan, Page, PageMeta, PageRequest, Slice, DEFAULT_LIMIT,
    DEFAULT_PAGE,
};
pub use shaping::{shape_document, shape_record, storage_field_name};
pub use ticker_engine::TickerEngine;
