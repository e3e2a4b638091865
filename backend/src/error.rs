use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Serialize, Serializer};
use serde_json::json;
use thiserror::Error;

use crate::ai::GatewayError;

#[derive(Error, Debug)]
pub enum LeafError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("AI gateway error: {0}")]
    Upstream(#[from] GatewayError),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),
}

impl Serialize for LeafError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.to_string().as_ref())
    }
}

pub type LeafResult<T> = Result<T, LeafError>;

impl From<JsonRejection> for LeafError {
    fn from(rejection: JsonRejection) -> Self {
        LeafError::Validation(rejection.body_text())
    }
}

impl LeafError {
    pub fn status(&self) -> StatusCode {
        match self {
            LeafError::Validation(_) | LeafError::Base64(_) => StatusCode::BAD_REQUEST,
            LeafError::NotFound(_) => StatusCode::NOT_FOUND,
            LeafError::Upstream(GatewayError::RateLimited) => StatusCode::TOO_MANY_REQUESTS,
            LeafError::Upstream(GatewayError::PaymentRequired) => StatusCode::PAYMENT_REQUIRED,
            LeafError::Upstream(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for LeafError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match self {
            LeafError::Database(ref e) => {
                tracing::error!("Database Error: {:?}", e);
                "Database request failed".to_string()
            }
            LeafError::Validation(msg) => msg,
            LeafError::NotFound(msg) => msg,
            LeafError::Upstream(ref e) => {
                tracing::warn!("AI gateway error: {}", e);
                e.to_string()
            }
            LeafError::Internal(msg) => {
                tracing::error!("Internal Error: {}", msg);
                "Internal server error".to_string()
            }
            LeafError::Base64(e) => format!("Invalid base64 image: {}", e),
            _ => {
                tracing::error!("Unhandled Error: {:?}", self);
                "Unexpected server error".to_string()
            }
        };

        let body = Json(json!({
            "success": false,
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
