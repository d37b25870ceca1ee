//! Page request validation and the stocks/indices split arithmetic
//!
//! Everything here is pure: the engine feeds in collection counts and gets
//! back how many records to skip and take from each collection.

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{Market, SortSpec};

use super::errors::TickerError;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;

/// Validated page request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub market: Market,
    pub page: u64,
    pub limit: u64,
    pub sort: SortSpec,
}

impl PageRequest {
    /// Build a request, rejecting `page < 1` or `limit < 1`
    pub fn new(market: Market, page: u64, limit: u64, sort: SortSpec) -> Result<Self, TickerError> {
        if page < 1 {
            return Err(TickerError::InvalidRequest(format!(
                "page must be greater than or equal to 1, got: {}",
                page
            )));
        }
        if limit < 1 {
            return Err(TickerError::InvalidRequest(format!(
                "limit must be greater than or equal to 1, got: {}",
                limit
            )));
        }

        Ok(Self {
            market,
            page,
            limit,
            sort,
        })
    }

    /// Number of items on all pages before this one
    pub fn items_before(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Skip/take for one collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Slice {
    pub skip: u64,
    pub limit: u64,
}

impl Slice {
    pub fn is_empty(&self) -> bool {
        self.limit == 0
    }
}

/// How one merged page is assembled from the two collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergePlan {
    pub stocks: Slice,
    pub indices: Slice,
}

/// Split a merged page between stocks and indices.
///
/// The page's `limit` slots are divided in proportion to each collection's
/// share of the total (`floor(limit * stocks / total)` to stocks, the rest to
/// indices, each capped at its collection size). Offsets assume stocks come
/// first: the items before this page are taken from stocks until stocks run
/// out, then from indices.
///
/// This is not a strict concatenate-then-slice: when the split ratio and the
/// page boundary disagree a page can be short or repeat index rows. Callers
/// depend on this exact arithmetic.
pub fn plan_merged_page(stocks_count: u64, indices_count: u64, page: u64, limit: u64) -> MergePlan {
    let total = stocks_count.saturating_add(indices_count);
    if total == 0 || limit == 0 {
        return MergePlan::default();
    }

    let (stocks_limit, indices_limit) = if stocks_count == 0 {
        (0, limit)
    } else if indices_count == 0 {
        (limit, 0)
    } else {
        // u128 keeps limit * count from overflowing
        let proportional = (limit as u128 * stocks_count as u128 / total as u128) as u64;
        let stocks_limit = proportional.min(stocks_count);
        let indices_limit = limit.saturating_sub(stocks_limit).min(indices_count);
        (stocks_limit, indices_limit)
    };

    let items_before = page.saturating_sub(1).saturating_mul(limit);
    let skip_stocks = items_before.min(stocks_count);
    let skip_indices = items_before.saturating_sub(stocks_count);

    MergePlan {
        stocks: Slice {
            skip: skip_stocks,
            limit: stocks_limit,
        },
        indices: Slice {
            skip: skip_indices,
            limit: indices_limit,
        },
    }
}

/// `ceil(total / limit)`, or 0 when there is nothing to page
pub fn total_pages(total: u64, limit: u64) -> u64 {
    if total == 0 || limit == 0 {
        return 0;
    }
    total.div_ceil(limit)
}

/// Reject pages past the end; any page is accepted when there are no pages
pub fn check_page_in_range(page: u64, total_pages: u64) -> Result<(), TickerError> {
    if total_pages > 0 && page > total_pages {
        return Err(TickerError::InvalidPage { page, total_pages });
    }
    Ok(())
}

/// Pagination metadata returned alongside a page of items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PageMeta {
    /// Items on this page
    pub count: u64,
    /// Matching records across the selected collections
    pub total: u64,
    pub page: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PageMeta {
    pub fn new(count: u64, total: u64, page: u64, limit: u64) -> Self {
        let total_pages = total_pages(total, limit);
        Self {
            count,
            total,
            page,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

/// One page of items plus its metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}
