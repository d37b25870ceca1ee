use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Jsonb, Timestamptz, Uuid as SqlUuid, Varchar};
use serde_json::Value;
use uuid::Uuid;

use crate::database::connection::DatabaseError;
use crate::models::{IndexRecord, StockRecord, TickerRecord};

/// One of the two ticker tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Stocks,
    Indices,
}

impl Collection {
    pub fn table_name(&self) -> &'static str {
        match self {
            Collection::Stocks => "stocks",
            Collection::Indices => "indices",
        }
    }
}

/// Raw row from `stocks` or `indices`.
///
/// Identity, ticker and audit timestamps live in columns; everything else is
/// kept in the `document` JSONB column under storage field names.
#[derive(Debug, Clone, QueryableByName)]
pub struct TickerRow {
    #[diesel(sql_type = SqlUuid)]
    pub id: Uuid,

    #[diesel(sql_type = Varchar)]
    pub ticker: String,

    #[diesel(sql_type = Jsonb)]
    pub document: Value,

    #[diesel(sql_type = Timestamptz)]
    pub created_at: DateTime<Utc>,

    #[diesel(sql_type = Timestamptz)]
    pub updated_at: DateTime<Utc>,
}

impl TickerRow {
    /// Rebuild the typed record, column values taking precedence over the document
    pub fn into_record(self, collection: Collection) -> Result<TickerRecord, DatabaseError> {
        let mut document = match self.document {
            Value::Object(map) => map,
            Value::Null => serde_json::Map::new(),
            other => {
                return Err(DatabaseError::QueryError(format!(
                    "{} document for {} is not an object: {}",
                    collection.table_name(),
                    self.ticker,
                    other
                )))
            }
        };

        document.insert("_id".to_string(), Value::String(self.id.to_string()));
        document.insert("ticker".to_string(), Value::String(self.ticker.clone()));
        document.insert(
            "createdAt".to_string(),
            Value::String(self.created_at.to_rfc3339()),
        );
        document.insert(
            "updatedAt".to_string(),
            Value::String(self.updated_at.to_rfc3339()),
        );

        let document = Value::Object(document);
        let decode_error = |e: serde_json::Error| {
            DatabaseError::QueryError(format!(
                "Malformed {} document for {}: {}",
                collection.table_name(),
                self.ticker,
                e
            ))
        };

        match collection {
            Collection::Stocks => serde_json::from_value::<StockRecord>(document)
                .map(TickerRecord::Stock)
                .map_err(decode_error),
            Collection::Indices => serde_json::from_value::<IndexRecord>(document)
                .map(TickerRecord::Index)
                .map_err(decode_error),
        }
    }
}

/// Result row of a `COUNT(*)` query
#[derive(Debug, Clone, Copy, QueryableByName)]
pub struct CountRow {
    #[diesel(sql_type = BigInt)]
    pub count: i64,
}
