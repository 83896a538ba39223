use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("HTTP request failed: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid barcode: {0}")]
    InvalidBarcode(String),

    #[error("Resource not found: {0}")]
    NotFoundError(String),

    #[error("Error response from upstream service '{service}': Status {status}")]
    UpstreamServiceError { service: String, status: u16 },

    #[error("Failed to process user flags: {0}")]
    FlagProcessingError(String),

    #[error("Failed to process product data: {0}")]
    ProductProcessingError(String),

    #[error("Invalid input: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::InvalidBarcode(msg) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid barcode: {}", msg),
            ),
            AppError::SerializationError(e) => {
                error!("Serialization error: {}", e);
                (StatusCode::BAD_REQUEST, "Invalid data format".to_string())
            }
            AppError::UpstreamServiceError { service, status } => {
                error!(
                    "Upstream service '{}' failed with status {}",
                    service, status
                );
                (
                    StatusCode::BAD_GATEWAY,
                    format!("Error communicating with {}", service),
                )
            }
            AppError::FlagProcessingError(msg) | AppError::ProductProcessingError(msg) => {
                error!("Data processing error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to process data".to_string(),
                )
            }
            AppError::ReqwestError(e) => {
                error!("HTTP client error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal network error".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
