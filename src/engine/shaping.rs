//! Output shaping: storage documents to public API objects

use serde_json::{Map, Value};

use crate::models::TickerRecord;

/// Storage field name to public field name. Fixed and exhaustive.
pub const FIELD_RENAMES: &[(&str, &str)] = &[
    ("_id", "id"),
    ("companyName", "company_name"),
    ("logoUrl", "logo_url"),
    ("zipCode", "zip_code"),
    ("yearBorn", "year_born"),
    ("maxAge", "max_age"),
    ("exercisedValue", "exercised_value"),
    ("unexercisedValue", "unexercised_value"),
    ("marketCap", "market_cap"),
    ("companyOfficers", "company_officers"),
    ("exchangeName", "exchange_name"),
    ("createdAt", "created_at"),
    ("updatedAt", "updated_at"),
];

/// Audit fields never emitted by the API
pub const STRIPPED_FIELDS: &[&str] = &["created_at", "updated_at"];

fn public_name(key: &str) -> Option<&'static str> {
    FIELD_RENAMES
        .iter()
        .find(|(storage, _)| *storage == key)
        .map(|(_, public)| *public)
}

/// Map a public field name back to its storage name; unknown names pass through
pub fn storage_field_name(field: &str) -> &str {
    FIELD_RENAMES
        .iter()
        .find(|(_, public)| *public == field)
        .map(|(storage, _)| *storage)
        .unwrap_or(field)
}

/// Rename keys through `FIELD_RENAMES`, descending into nested objects and arrays
pub fn rename_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| {
                    let key = public_name(&key).map(str::to_string).unwrap_or(key);
                    (key, rename_keys(value))
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(rename_keys).collect()),
        other => other,
    }
}

/// Shape a stored document for output: rename keys, stringify the id, drop audit fields
pub fn shape_document(document: Map<String, Value>) -> Map<String, Value> {
    let mut shaped = match rename_keys(Value::Object(document)) {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    if let Some(id) = shaped.get_mut("id") {
        if !id.is_string() {
            let text = match &*id {
                Value::Null => String::new(),
                other => other.to_string(),
            };
            *id = Value::String(text);
        }
    }

    for field in STRIPPED_FIELDS {
        shaped.remove(*field);
    }

    shaped
}

/// Shape a ticker record for the public API
pub fn shape_record(record: &TickerRecord) -> Value {
    match record.to_document() {
        Ok(document) => Value::Object(shape_document(document)),
        Err(e) => {
            // Records are plain data; serialization only fails on a broken invariant
            tracing::error!("Failed to serialize ticker {}: {}", record.ticker(), e);
            let mut fallback = Map::new();
            fallback.insert("id".to_string(), Value::String(record.id().to_string()));
            fallback.insert("ticker".to_string(), Value::String(record.ticker().to_string()));
            Value::Object(fallback)
        }
    }
}
