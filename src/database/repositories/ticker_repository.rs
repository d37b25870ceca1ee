use crate::database::connection::{DatabaseError, PgPooledConnection};
use crate::database::models::{Collection, CountRow, TickerRow};
use crate::models::{SortOrder, SortSpec, TickerRecord};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Text, Varchar};
use std::sync::Arc;

/// Read capability of one ticker collection (stocks or indices)
///
/// The pagination engine is written against this trait only, so it can run
/// against PostgreSQL or the in-memory store interchangeably.
pub trait TickerStore: Send + Sync {
    /// Which collection this store reads
    fn collection(&self) -> Collection;

    /// Count records matching the query
    fn count(&self, sort: &SortSpec) -> Result<u64, DatabaseError>;

    /// Fetch one ordered slice of records
    fn page(&self, sort: &SortSpec, skip: u64, limit: u64)
        -> Result<Vec<TickerRecord>, DatabaseError>;

    /// Find a record by its ticker symbol
    fn find_by_ticker(&self, ticker: &str) -> Result<Option<TickerRecord>, DatabaseError>;
}

/// How a sort field maps onto the table layout
#[derive(Debug, Clone, PartialEq, Eq)]
enum SortTarget<'a> {
    Natural,
    Column(&'static str),
    DocumentKey(&'a str),
}

fn sort_target(field: Option<&str>) -> SortTarget<'_> {
    match field {
        None => SortTarget::Natural,
        Some("_id") => SortTarget::Column("id"),
        Some("ticker") => SortTarget::Column("ticker"),
        Some("createdAt") => SortTarget::Column("created_at"),
        Some("updatedAt") => SortTarget::Column("updated_at"),
        Some(key) => SortTarget::DocumentKey(key),
    }
}

const SELECT_COLUMNS: &str = "id, ticker, document, created_at, updated_at";

/// PostgreSQL implementation of TickerStore for a single table
pub struct TickerRepositoryImpl {
    collection: Collection,
    get_conn: Arc<dyn Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync>,
}

impl TickerRepositoryImpl {
    /// Create a repository over `collection` with a connection provider
    pub fn new<F>(collection: Collection, get_conn: F) -> Self
    where
        F: Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync + 'static,
    {
        Self {
            collection,
            get_conn: Arc::new(get_conn),
        }
    }

    fn order_clause(target: &SortTarget<'_>, sort: &SortSpec) -> String {
        let direction = sort.order.as_sql();
        match target {
            SortTarget::Natural => "created_at ASC, id ASC".to_string(),
            SortTarget::Column(column) => format!("{column} {direction}, id {direction}"),
            // $3 is bound after OFFSET/LIMIT. A missing key is SQL NULL and must
            // sort like JSON null: first ascending, last descending.
            SortTarget::DocumentKey(_) => {
                let nulls = match sort.order {
                    SortOrder::Asc => "NULLS FIRST",
                    SortOrder::Desc => "NULLS LAST",
                };
                format!("document -> $3 {direction} {nulls}, id {direction}")
            }
        }
    }
}

impl TickerStore for TickerRepositoryImpl {
    fn collection(&self) -> Collection {
        self.collection
    }

    fn count(&self, _sort: &SortSpec) -> Result<u64, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        let row = sql_query(format!(
            "SELECT COUNT(*) AS count FROM {}",
            self.collection.table_name()
        ))
        .get_result::<CountRow>(&mut conn)?;

        Ok(u64::try_from(row.count).unwrap_or(0))
    }

    fn page(
        &self,
        sort: &SortSpec,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<TickerRecord>, DatabaseError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut conn = (self.get_conn)()?;
        let target = sort_target(sort.field.as_deref());

        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM {} ORDER BY {} OFFSET $1 LIMIT $2",
            self.collection.table_name(),
            Self::order_clause(&target, sort)
        );

        let mut query = sql_query(sql)
            .into_boxed::<Pg>()
            .bind::<BigInt, _>(i64::try_from(skip).unwrap_or(i64::MAX))
            .bind::<BigInt, _>(i64::try_from(limit).unwrap_or(i64::MAX));

        if let SortTarget::DocumentKey(key) = target {
            query = query.bind::<Text, _>(key.to_string());
        }

        query
            .load::<TickerRow>(&mut conn)?
            .into_iter()
            .map(|row| row.into_record(self.collection))
            .collect()
    }

    fn find_by_ticker(&self, ticker: &str) -> Result<Option<TickerRecord>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        sql_query(format!(
            "SELECT {SELECT_COLUMNS} FROM {} WHERE ticker = $1 LIMIT 1",
            self.collection.table_name()
        ))
        .bind::<Varchar, _>(ticker.to_string())
        .get_result::<TickerRow>(&mut conn)
        .optional()?
        .map(|row| row.into_record(self.collection))
        .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_target_mapping() {
        assert_eq!(sort_target(None), SortTarget::Natural);
        assert_eq!(sort_target(Some("_id")), SortTarget::Column("id"));
        assert_eq!(sort_target(Some("createdAt")), SortTarget::Column("created_at"));
        assert_eq!(
            sort_target(Some("marketCap")),
            SortTarget::DocumentKey("marketCap")
        );
    }

    #[test]
    fn test_order_clause() {
        let sort = SortSpec::by("marketCap", SortOrder::Desc);
        let target = sort_target(sort.field.as_deref());
        assert_eq!(
            TickerRepositoryImpl::order_clause(&target, &sort),
            "document -> $3 DESC NULLS LAST, id DESC"
        );

        let sort = SortSpec::by("marketCap", SortOrder::Asc);
        let target = sort_target(sort.field.as_deref());
        assert_eq!(
            TickerRepositoryImpl::order_clause(&target, &sort),
            "document -> $3 ASC NULLS FIRST, id ASC"
        );

        let sort = SortSpec::by("ticker", SortOrder::Asc);
        let target = sort_target(sort.field.as_deref());
        assert_eq!(
            TickerRepositoryImpl::order_clause(&target, &sort),
            "ticker ASC, id ASC"
        );
    }

    // Tests require actual database connection - skip in CI
    #[test]
    #[ignore]
    fn test_ticker_repository() {
        let database_url = std::env::var("DATABASE_URL").unwrap();
        let pool = crate::database::establish_connection_pool(&database_url, 2).unwrap();
        pool.run_migrations().unwrap();

        let repo = TickerRepositoryImpl::new(Collection::Stocks, move || pool.get_conn());
        let total = repo.count(&SortSpec::unsorted()).unwrap();
        let page = repo.page(&SortSpec::unsorted(), 0, 5).unwrap();
        assert!(page.len() as u64 <= total.min(5));
    }
}
