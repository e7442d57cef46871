use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use cinecache_core::{ServiceError, providers::ProviderError};

use crate::stream::SignError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "message": self.message,
                "status": self.status.as_u16(),
            }
        }));

        (self.status, body).into_response()
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(msg) => Self::not_found(msg),
            ServiceError::Upstream(ProviderError::NotFound) => {
                Self::not_found("Resource not found upstream")
            }
            ServiceError::Upstream(err) => {
                tracing::warn!(error = %err, "upstream fetch failed");
                Self::bad_gateway(err.to_string())
            }
        }
    }
}

impl From<SignError> for AppError {
    fn from(err: SignError) -> Self {
        match err {
            SignError::InvalidUrl(_) | SignError::UnsupportedScheme(_) => {
                Self::bad_request(err.to_string())
            }
            SignError::Expired | SignError::BadSignature => {
                Self::forbidden(err.to_string())
            }
            SignError::Resolve(_) => Self::bad_gateway(err.to_string()),
            SignError::InvalidKey => {
                tracing::error!("stream signer rejected its key");
                Self::internal("Stream signing unavailable")
            }
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(err.to_string())
    }
}
