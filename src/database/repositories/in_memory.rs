//! In-memory stores used when no database is configured, and by tests

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde_json::Value;
use uuid::Uuid;

use crate::database::connection::DatabaseError;
use crate::database::models::Collection;
use crate::models::{NewUser, SortOrder, SortSpec, TickerRecord, User};

use super::{TickerStore, UserRepository};

/// Vector-backed ticker collection; insertion order is the natural order
#[derive(Clone)]
pub struct InMemoryTickerStore {
    collection: Collection,
    records: Arc<RwLock<Vec<TickerRecord>>>,
}

impl InMemoryTickerStore {
    pub fn new(collection: Collection) -> Self {
        Self {
            collection,
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn with_records<I, R>(collection: Collection, records: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<TickerRecord>,
    {
        let store = Self::new(collection);
        for record in records {
            store.upsert(record.into());
        }
        store
    }

    /// Insert a record, replacing any record with the same ticker
    pub fn upsert(&self, record: TickerRecord) {
        let mut records = self.records.write();
        match records.iter_mut().find(|r| r.ticker() == record.ticker()) {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    fn sorted(&self, sort: &SortSpec) -> Vec<TickerRecord> {
        let records = self.records.read().clone();

        let Some(field) = sort.field.as_deref() else {
            return records;
        };

        let mut keyed: Vec<(Value, TickerRecord)> = records
            .into_iter()
            .map(|record| (sort_key(&record, field), record))
            .collect();

        // Stable sort: ties keep insertion order
        keyed.sort_by(|(a, _), (b, _)| {
            let ordering = compare_values(a, b);
            match sort.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        keyed.into_iter().map(|(_, record)| record).collect()
    }
}

fn sort_key(record: &TickerRecord, field: &str) -> Value {
    record
        .to_document()
        .ok()
        .and_then(|mut doc| doc.remove(field))
        .unwrap_or(Value::Null)
}

/// Type rank used to order values of different JSON types
fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::Object(_) => 3,
        Value::Array(_) => 4,
        Value::Bool(_) => 5,
    }
}

/// Missing and null sort first, then numbers, strings, objects, arrays, booleans
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

impl TickerStore for InMemoryTickerStore {
    fn collection(&self) -> Collection {
        self.collection
    }

    fn count(&self, _sort: &SortSpec) -> Result<u64, DatabaseError> {
        Ok(self.records.read().len() as u64)
    }

    fn page(
        &self,
        sort: &SortSpec,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<TickerRecord>, DatabaseError> {
        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);

        Ok(self.sorted(sort).into_iter().skip(skip).take(limit).collect())
    }

    fn find_by_ticker(&self, ticker: &str) -> Result<Option<TickerRecord>, DatabaseError> {
        Ok(self
            .records
            .read()
            .iter()
            .find(|record| record.ticker() == ticker)
            .cloned())
    }
}

/// DashMap-backed user store keyed by email
#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<DashMap<String, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserRepository for InMemoryUserRepository {
    fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        Ok(self.users.get(email).map(|user| user.value().clone()))
    }

    fn find_by_api_key(&self, api_key: &str) -> Result<Option<User>, DatabaseError> {
        if api_key.is_empty() {
            return Ok(None);
        }

        Ok(self
            .users
            .iter()
            .find(|entry| entry.api_key.as_deref() == Some(api_key))
            .map(|entry| entry.value().clone()))
    }

    fn insert(&self, new_user: NewUser) -> Result<User, DatabaseError> {
        match self.users.entry(new_user.email.clone()) {
            Entry::Occupied(_) => Err(DatabaseError::Conflict(format!(
                "User {} already exists",
                new_user.email
            ))),
            Entry::Vacant(slot) => {
                let now = Utc::now();
                let user = User {
                    id: Uuid::new_v4(),
                    name: new_user.name,
                    email: new_user.email,
                    password_hash: new_user.password_hash,
                    api_key: None,
                    created_at: now,
                    updated_at: now,
                };
                slot.insert(user.clone());
                Ok(user)
            }
        }
    }

    fn set_api_key(
        &self,
        email: &str,
        api_key: Option<String>,
    ) -> Result<Option<User>, DatabaseError> {
        Ok(self.users.get_mut(email).map(|mut user| {
            user.api_key = api_key;
            user.updated_at = Utc::now();
            user.clone()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StockRecord;

    fn stock_store() -> InMemoryTickerStore {
        InMemoryTickerStore::with_records(
            Collection::Stocks,
            vec![
                StockRecord::new("MSFT").with_market_cap(300),
                StockRecord::new("AAPL").with_market_cap(500),
                StockRecord::new("IBM"),
                StockRecord::new("NVDA").with_market_cap(400),
            ],
        )
    }

    fn tickers(records: &[TickerRecord]) -> Vec<&str> {
        records.iter().map(|r| r.ticker()).collect()
    }

    #[test]
    fn test_natural_order_is_insertion_order() {
        let store = stock_store();
        let page = store.page(&SortSpec::unsorted(), 1, 2).unwrap();
        assert_eq!(tickers(&page), vec!["AAPL", "IBM"]);
    }

    #[test]
    fn test_sort_by_field_ascending_puts_missing_first() {
        let store = stock_store();
        let sort = SortSpec::by("marketCap", SortOrder::Asc);
        let page = store.page(&sort, 0, 10).unwrap();
        assert_eq!(tickers(&page), vec!["IBM", "MSFT", "NVDA", "AAPL"]);
    }

    #[test]
    fn test_sort_by_field_descending() {
        let store = stock_store();
        let sort = SortSpec::by("marketCap", SortOrder::Desc);
        let page = store.page(&sort, 0, 2).unwrap();
        assert_eq!(tickers(&page), vec!["AAPL", "NVDA"]);
    }

    #[test]
    fn test_upsert_replaces_by_ticker() {
        let store = stock_store();
        store.upsert(StockRecord::new("IBM").with_market_cap(1).into());
        assert_eq!(store.len(), 4);
        assert_eq!(store.count(&SortSpec::unsorted()).unwrap(), 4);
    }

    #[test]
    fn test_skip_past_end_is_empty() {
        let store = stock_store();
        assert!(store.page(&SortSpec::unsorted(), 10, 5).unwrap().is_empty());
    }

    #[test]
    fn test_user_insert_conflict_and_api_key() {
        let repo = InMemoryUserRepository::new();
        let user = repo
            .insert(NewUser::new("Ada".into(), "ada@example.com".into(), "hash".into()))
            .unwrap();
        assert!(user.api_key.is_none());

        let dup = repo.insert(NewUser::new("Ada".into(), "ada@example.com".into(), "x".into()));
        assert!(matches!(dup, Err(DatabaseError::Conflict(_))));

        repo.set_api_key("ada@example.com", Some("key-1".into())).unwrap();
        let found = repo.find_by_api_key("key-1").unwrap().unwrap();
        assert_eq!(found.email, "ada@example.com");

        repo.set_api_key("ada@example.com", None).unwrap();
        assert!(repo.find_by_api_key("key-1").unwrap().is_none());
        assert!(repo.find_by_api_key("").unwrap().is_none());
    }
}
