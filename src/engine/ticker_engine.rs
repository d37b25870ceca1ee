use std::sync::Arc;

use crate::database::repositories::TickerStore;
use crate::models::{Market, SortSpec, TickerRecord};

use super::errors::TickerError;
use super::pagination::{
    check_page_in_range, plan_merged_page, total_pages, Page, PageMeta, PageRequest,
};

/// Pagination and lookup over the Stocks and Indices collections.
///
/// Stateless: every call issues independent read-only queries against the two
/// stores. With `Market::All` a page is assembled from both collections,
/// stocks first, using the proportional split in [`plan_merged_page`].
#[derive(Clone)]
pub struct TickerEngine {
    stocks: Arc<dyn TickerStore>,
    indices: Arc<dyn TickerStore>,
}

impl TickerEngine {
    pub fn new(stocks: Arc<dyn TickerStore>, indices: Arc<dyn TickerStore>) -> Self {
        Self { stocks, indices }
    }

    /// Fetch one page of tickers
    ///
    /// # Errors
    /// * `InvalidPage` if `request.page` is past the last page
    /// * `CollaboratorUnavailable` if either store fails; no partial page is returned
    pub fn get_page(&self, request: &PageRequest) -> Result<Page<TickerRecord>, TickerError> {
        match request.market {
            Market::Stocks => self.single_collection_page(self.stocks.as_ref(), request),
            Market::Indices => self.single_collection_page(self.indices.as_ref(), request),
            Market::All => self.merged_page(request),
        }
    }

    /// Look up a ticker in Stocks, then Indices
    pub fn get_by_ticker(&self, ticker: &str) -> Result<TickerRecord, TickerError> {
        if let Some(stock) = self.stocks.find_by_ticker(ticker)? {
            return Ok(stock);
        }

        self.indices
            .find_by_ticker(ticker)?
            .ok_or_else(|| TickerError::NotFound(ticker.to_string()))
    }

    fn single_collection_page(
        &self,
        store: &dyn TickerStore,
        request: &PageRequest,
    ) -> Result<Page<TickerRecord>, TickerError> {
        let total = store.count(&request.sort)?;
        check_page_in_range(request.page, total_pages(total, request.limit))?;

        let items = store.page(&request.sort, request.items_before(), request.limit)?;

        tracing::debug!(
            "{:?} page {} (limit {}): {} of {} records",
            store.collection(),
            request.page,
            request.limit,
            items.len(),
            total
        );

        Ok(Self::finish(items, total, request))
    }

    fn merged_page(&self, request: &PageRequest) -> Result<Page<TickerRecord>, TickerError> {
        let stocks_count = self.stocks.count(&request.sort)?;
        let indices_count = self.indices.count(&request.sort)?;
        let total = stocks_count.saturating_add(indices_count);

        check_page_in_range(request.page, total_pages(total, request.limit))?;

        let plan = plan_merged_page(stocks_count, indices_count, request.page, request.limit);
        let mut items = Vec::new();

        if !plan.stocks.is_empty() {
            items.extend(self.fetch(self.stocks.as_ref(), &request.sort, plan.stocks.skip, plan.stocks.limit)?);
        }
        if !plan.indices.is_empty() {
            items.extend(self.fetch(self.indices.as_ref(), &request.sort, plan.indices.skip, plan.indices.limit)?);
        }

        tracing::debug!(
            "Merged page {} (limit {}): stocks {:?}, indices {:?}, {} items of {}",
            request.page,
            request.limit,
            plan.stocks,
            plan.indices,
            items.len(),
            total
        );

        Ok(Self::finish(items, total, request))
    }

    fn fetch(
        &self,
        store: &dyn TickerStore,
        sort: &SortSpec,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<TickerRecord>, TickerError> {
        store.page(sort, skip, limit).map_err(|e| {
            tracing::error!("Failed to page {:?}: {}", store.collection(), e);
            TickerError::from(e)
        })
    }

    fn finish(mut items: Vec<TickerRecord>, total: u64, request: &PageRequest) -> Page<TickerRecord> {
        // A misbehaving store must not break the page-size bound
        items.truncate(usize::try_from(request.limit).unwrap_or(usize::MAX));

        let meta = PageMeta::new(items.len() as u64, total, request.page, request.limit);
        Page { items, meta }
    }
}
