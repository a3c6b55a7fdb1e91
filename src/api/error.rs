// =============================================================================
// API Errors — typed failures mapped onto HTTP responses
// =============================================================================

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::prediction::PredictionError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("stock {0} not found")]
    StockNotFound(i64),
    #[error("price {0} not found")]
    PriceNotFound(i64),
    #[error("no price data for stock {0}")]
    NoPriceData(i64),
    #[error("invalid request: {message}")]
    InvalidRequest { status: StatusCode, message: String },
    #[error(transparent)]
    Prediction(#[from] PredictionError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::StockNotFound(_) => (StatusCode::NOT_FOUND, "STOCK_NOT_FOUND"),
            ApiError::PriceNotFound(_) => (StatusCode::NOT_FOUND, "PRICE_NOT_FOUND"),
            ApiError::NoPriceData(_) => (StatusCode::NOT_FOUND, "NO_PRICE_DATA"),
            ApiError::InvalidRequest { status, .. } => (*status, "INVALID_REQUEST"),
            ApiError::Prediction(PredictionError::InsufficientData { .. }) => {
                (StatusCode::BAD_REQUEST, "INSUFFICIENT_DATA")
            }
            ApiError::Prediction(_) => (StatusCode::BAD_REQUEST, "INVALID_PARAMETER"),
            ApiError::Store(StoreError::DuplicateSymbol(_)) => {
                (StatusCode::BAD_REQUEST, "DUPLICATE_SYMBOL")
            }
            ApiError::Store(StoreError::StockNotFound(_)) => {
                (StatusCode::BAD_REQUEST, "UNKNOWN_STOCK")
            }
            ApiError::Store(StoreError::DuplicatePriceDate { .. }) => {
                (StatusCode::BAD_REQUEST, "DUPLICATE_PRICE_DATE")
            }
            ApiError::Store(StoreError::Series(_) | StoreError::Database(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code,
        });

        (status, body).into_response()
    }
}
