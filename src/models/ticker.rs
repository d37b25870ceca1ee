use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Officer listed on a stock's company profile.
///
/// Numeric attributes are kept as raw JSON: upstream feeds mix integers,
/// floats and `{"raw": ..}` objects for the same key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyOfficer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(rename = "yearBorn", default, skip_serializing_if = "Option::is_none")]
    pub year_born: Option<Value>,

    #[serde(rename = "maxAge", default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<Value>,

    #[serde(rename = "exercisedValue", default, skip_serializing_if = "Option::is_none")]
    pub exercised_value: Option<Value>,

    #[serde(rename = "unexercisedValue", default, skip_serializing_if = "Option::is_none")]
    pub unexercised_value: Option<Value>,

    /// Any other attributes present on the stored document
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Stock document as held by the Stocks collection.
///
/// Field names on the wire are the storage names (`_id`, `companyName`, ...);
/// the public API renames them during output shaping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    #[serde(rename = "_id")]
    pub id: Uuid,

    pub ticker: String,

    #[serde(rename = "companyName", default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,

    #[serde(rename = "logoUrl", default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(rename = "zipCode", default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,

    /// Raw JSON, see [`CompanyOfficer`]
    #[serde(rename = "marketCap", default, skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<Value>,

    #[serde(rename = "exchangeName", default, skip_serializing_if = "Option::is_none")]
    pub exchange_name: Option<String>,

    #[serde(rename = "companyOfficers", default, skip_serializing_if = "Vec::is_empty")]
    pub company_officers: Vec<CompanyOfficer>,

    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StockRecord {
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            ticker: ticker.into(),
            company_name: None,
            logo_url: None,
            sector: None,
            industry: None,
            address: None,
            city: None,
            zip_code: None,
            country: None,
            website: None,
            market_cap: None,
            exchange_name: None,
            company_officers: Vec::new(),
            created_at: None,
            updated_at: None,
            extra: Map::new(),
        }
    }

    pub fn with_company_name(mut self, company_name: impl Into<String>) -> Self {
        self.company_name = Some(company_name.into());
        self
    }

    pub fn with_market_cap(mut self, market_cap: u64) -> Self {
        self.market_cap = Some(Value::from(market_cap));
        self
    }

    pub fn with_exchange_name(mut self, exchange_name: impl Into<String>) -> Self {
        self.exchange_name = Some(exchange_name.into());
        self
    }

    pub fn with_officer(mut self, officer: CompanyOfficer) -> Self {
        self.company_officers.push(officer);
        self
    }

    pub fn with_timestamps(mut self, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self.updated_at = Some(updated_at);
        self
    }
}

/// Market index document as held by the Indices collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRecord {
    #[serde(rename = "_id")]
    pub id: Uuid,

    pub ticker: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "exchangeName", default, skip_serializing_if = "Option::is_none")]
    pub exchange_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl IndexRecord {
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            ticker: ticker.into(),
            name: None,
            exchange_name: None,
            currency: None,
            created_at: None,
            updated_at: None,
            extra: Map::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_exchange_name(mut self, exchange_name: impl Into<String>) -> Self {
        self.exchange_name = Some(exchange_name.into());
        self
    }
}

/// A record from either ticker collection
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TickerRecord {
    Stock(StockRecord),
    Index(IndexRecord),
}

impl TickerRecord {
    pub fn id(&self) -> Uuid {
        match self {
            TickerRecord::Stock(stock) => stock.id,
            TickerRecord::Index(index) => index.id,
        }
    }

    pub fn ticker(&self) -> &str {
        match self {
            TickerRecord::Stock(stock) => &stock.ticker,
            TickerRecord::Index(index) => &index.ticker,
        }
    }

    pub fn is_stock(&self) -> bool {
        matches!(self, TickerRecord::Stock(_))
    }

    pub fn is_index(&self) -> bool {
        matches!(self, TickerRecord::Index(_))
    }

    /// Serialize to the stored document form (storage field names)
    pub fn to_document(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(serde::ser::Error::custom(format!(
                "ticker record serialized to non-object: {}",
                other
            ))),
        }
    }
}

impl From<StockRecord> for TickerRecord {
    fn from(stock: StockRecord) -> Self {
        TickerRecord::Stock(stock)
    }
}

impl From<IndexRecord> for TickerRecord {
    fn from(index: IndexRecord) -> Self {
        TickerRecord::Index(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stock_document_roundtrip_keeps_unknown_fields() {
        let doc = json!({
            "_id": "6f2c1f1e-3c0a-4d59-9c62-3f0f2b3a9d10",
            "ticker": "AAPL",
            "companyName": "Apple Inc.",
            "marketCap": 3000000000000u64,
            "beta": 1.2,
            "companyOfficers": [
                { "name": "Tim Cook", "yearBorn": 1961, "maxAge": 1, "fiscalYear": 2023 }
            ]
        });

        let stock: StockRecord = serde_json::from_value(doc).unwrap();
        assert_eq!(stock.ticker, "AAPL");
        assert_eq!(stock.company_name.as_deref(), Some("Apple Inc."));
        assert_eq!(stock.market_cap, Some(json!(3_000_000_000_000u64)));
        assert_eq!(stock.extra.get("beta"), Some(&json!(1.2)));
        assert_eq!(stock.company_officers[0].year_born, Some(json!(1961)));
        assert_eq!(
            stock.company_officers[0].extra.get("fiscalYear"),
            Some(&json!(2023))
        );

        let back = TickerRecord::from(stock).to_document().unwrap();
        assert_eq!(back.get("companyName"), Some(&json!("Apple Inc.")));
        assert_eq!(back.get("beta"), Some(&json!(1.2)));
    }

    #[test]
    fn test_loose_numeric_attributes_are_kept_as_is() {
        let doc = json!({
            "_id": "6f2c1f1e-3c0a-4d59-9c62-3f0f2b3a9d10",
            "ticker": "AAPL",
            "marketCap": 3.0e12,
            "companyOfficers": [
                { "name": "Tim Cook", "yearBorn": 1961.0, "exercisedValue": { "raw": 0 } }
            ]
        });

        let stock: StockRecord = serde_json::from_value(doc).unwrap();
        assert_eq!(stock.market_cap, Some(json!(3.0e12)));
        assert_eq!(stock.company_officers[0].year_born, Some(json!(1961.0)));
        assert_eq!(stock.company_officers[0].exercised_value, Some(json!({ "raw": 0 })));

        let back = TickerRecord::from(stock).to_document().unwrap();
        assert_eq!(back.get("marketCap"), Some(&json!(3.0e12)));
    }

    #[test]
    fn test_ticker_record_accessors() {
        let index: TickerRecord = IndexRecord::new("^GSPC").with_name("S&P 500").into();
        assert_eq!(index.ticker(), "^GSPC");
        assert!(index.is_index());
        assert!(!index.is_stock());
    }
}
