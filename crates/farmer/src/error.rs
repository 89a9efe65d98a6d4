use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Error kinds the shard server can produce, each carrying the exact
/// status code and message string a caller (or a test asserting on wire
/// behavior) should see.
#[derive(Error, Debug)]
pub enum FarmerError {
    #[error("Token not found")]
    TokenNotFound,
    #[error("Token expired")]
    TokenExpired,
    #[error("Token not valid for hash")]
    TokenHashMismatch,
    #[error("Shard not found")]
    ShardNotFound,
    #[error("Insufficient storage space")]
    InsufficientSpace,
    #[error("Shard exceeds the amount defined in the contract")]
    ShardExceedsContract,
    #[error("Shard hash does not match contract")]
    FailedIntegrity,
    #[error("Failed to read shard")]
    ReadFailed,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FarmerError {
    fn status(&self) -> StatusCode {
        match self {
            FarmerError::TokenNotFound | FarmerError::TokenExpired | FarmerError::TokenHashMismatch => {
                StatusCode::UNAUTHORIZED
            }
            FarmerError::ShardNotFound => StatusCode::NOT_FOUND,
            FarmerError::InsufficientSpace => StatusCode::SERVICE_UNAVAILABLE,
            FarmerError::ShardExceedsContract | FarmerError::FailedIntegrity => StatusCode::BAD_REQUEST,
            FarmerError::ReadFailed | FarmerError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for FarmerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "result": self.to_string() }));
        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, FarmerError>;
