//--------------------------------------------------------------------------------------------------
// ENUMS
//--------------------------------------------------------------------------------------------------
// | Name      | Description                                           |
// |-----------|-------------------------------------------------------|
// | ApiError  | Maps matching-engine errors onto the HTTP status codes |
// |           | named in the external interface contract               |
//--------------------------------------------------------------------------------------------------

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{ExchangeError, OrderBookError};

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("unknown user: {0}")]
    UnknownUser(Uuid),
    #[error("insufficient liquidity or no matching orders")]
    InsufficientLiquidity,
    #[error("settlement failed: {0}")]
    SettlementFault(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::UnknownUser(id) => (StatusCode::NOT_FOUND, format!("unknown user: {id}")),
            Self::InsufficientLiquidity => (StatusCode::EXPECTATION_FAILED, self.to_string()),
            Self::SettlementFault(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": {
                "message": message,
                "code": status.as_u16(),
            }
        }));

        (status, body).into_response()
    }
}

impl From<ExchangeError> for ApiError {
    fn from(err: ExchangeError) -> Self {
        match err {
            ExchangeError::UnknownMarket(market) => {
                Self::InvalidRequest(format!("unknown market: {market}"))
            }
            ExchangeError::UnknownUser(id) => Self::UnknownUser(id),
            ExchangeError::OrderBook(inner) => inner.into(),
        }
    }
}

impl From<OrderBookError> for ApiError {
    fn from(err: OrderBookError) -> Self {
        match err {
            OrderBookError::InvalidSize | OrderBookError::InvalidPrice => {
                Self::InvalidRequest(err.to_string())
            }
            OrderBookError::InsufficientLiquidity => Self::InsufficientLiquidity,
            OrderBookError::SettlementFault(e) => Self::SettlementFault(e.to_string()),
        }
    }
}
