use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::engine::PageMeta;
use crate::models::{PriceQuote, UserProfile};

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_ERROR: &str = "error";

/// Query parameters for `GET /tickers`
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TickerQuery {
    /// `stocks` or `indices`; anything else includes both
    pub market: Option<String>,
    /// Page number, starting at 1
    pub page: Option<i64>,
    /// Items per page
    pub limit: Option<i64>,
    /// Field to sort by (storage or public name)
    pub sort_by: Option<String>,
    /// `asc` (default) or `desc`
    pub order: Option<String>,
}

/// Page of tickers
#[derive(Debug, Serialize, ToSchema)]
pub struct TickerListResponse {
    #[schema(example = "success")]
    pub status: String,
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<Value>,
    pub pagination: PageMeta,
}

/// Single ticker
#[derive(Debug, Serialize, ToSchema)]
pub struct TickerResponse {
    #[schema(example = "success")]
    pub status: String,
    #[schema(value_type = Object)]
    pub data: Value,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PriceResponse {
    #[schema(example = "success")]
    pub status: String,
    pub data: PriceQuote,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = "success")]
    pub status: String,
    pub data: UserProfile,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiKeyData {
    pub api_key: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiKeyResponse {
    #[schema(example = "success")]
    pub status: String,
    pub data: ApiKeyData,
}

/// Plain status + message body
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "success")]
    pub status: String,
    pub message: String,
}

/// Error body
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "error")]
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// `postgres` or `memory`
    pub storage: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl TickerListResponse {
    pub fn new(data: Vec<Value>, pagination: PageMeta) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            data,
            pagination,
        }
    }
}

impl TickerResponse {
    pub fn new(data: Value) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            data,
        }
    }
}

impl PriceResponse {
    pub fn new(data: PriceQuote) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            data,
        }
    }
}

impl UserResponse {
    pub fn new(data: UserProfile) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            data,
        }
    }
}

impl ApiKeyResponse {
    pub fn new(api_key: String) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            data: ApiKeyData { api_key },
        }
    }
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            message: message.into(),
        }
    }
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: STATUS_ERROR.to_string(),
            message: message.into(),
        }
    }
}
