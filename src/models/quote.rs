use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Live price fields for a single ticker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PriceQuote {
    #[schema(value_type = f64, example = 189.84)]
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    #[schema(value_type = f64, example = -1.27)]
    #[serde(with = "rust_decimal::serde::float")]
    pub price_change: Decimal,

    #[schema(value_type = f64, example = -0.664)]
    #[serde(with = "rust_decimal::serde::float")]
    pub price_change_percent: Decimal,

    pub volume: u64,

    pub avg_volume: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_quote_serializes_prices_as_numbers() {
        let quote = PriceQuote {
            price: dec!(189.5),
            price_change: dec!(-1.25),
            price_change_percent: dec!(-0.5),
            volume: 1_000,
            avg_volume: 2_000,
        };

        let json = serde_json::to_value(&quote).unwrap();
        assert_eq!(json["price"], serde_json::json!(189.5));
        assert_eq!(json["price_change"], serde_json::json!(-1.25));
        assert_eq!(json["avg_volume"], serde_json::json!(2000));
    }
}
