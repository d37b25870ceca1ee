use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Which collection(s) a ticker query runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Market {
    /// Stocks and indices together (merged pagination)
    #[default]
    All,
    Stocks,
    Indices,
}

impl Market {
    /// Parse the `market` query value.
    ///
    /// Only the exact values `stocks` and `indices` select a single collection;
    /// every other value, including an absent parameter, selects both.
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("stocks") => Market::Stocks,
            Some("indices") => Market::Indices,
            _ => Market::All,
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Descending only when the value is `desc` (any case); ascending otherwise
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Sort settings handed to the ticker stores.
///
/// `field` is always a storage field name (e.g. `marketCap`); `None` keeps the
/// store's natural order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SortSpec {
    pub field: Option<String>,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new(field: Option<String>, order: SortOrder) -> Self {
        Self { field, order }
    }

    /// Natural store order, no explicit sort
    pub fn unsorted() -> Self {
        Self::default()
    }

    pub fn by(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: Some(field.into()),
            order,
        }
    }
}
