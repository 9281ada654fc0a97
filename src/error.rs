//! API Error Types
//! Mission: Map every failure onto one consistent HTTP response shape

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::error;

/// Errors surfaced by HTTP handlers and middleware
#[derive(Debug)]
pub enum ApiError {
    /// Bad input, duplicate email, wrong credentials (400)
    Validation(String),
    /// No bearer token on a protected route (401)
    MissingToken,
    /// Token signature or structure is invalid (401)
    InvalidToken,
    /// Token was valid once but has expired (401, `expired: true`)
    TokenExpired { expired_at: DateTime<Utc> },
    /// Authenticated but not allowed (403)
    Forbidden(&'static str),
    /// Unknown record, or a record outside the caller's scope (404)
    NotFound(&'static str),
    /// Anything unexpected (500), reported generically
    Internal(anyhow::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::MissingToken | ApiError::InvalidToken | ApiError::TokenExpired { .. } => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Validation(message) => write!(f, "{}", message),
            ApiError::MissingToken => write!(f, "Missing authorization token"),
            ApiError::InvalidToken => write!(f, "Invalid token"),
            ApiError::TokenExpired { .. } => write!(f, "Token expired"),
            ApiError::Forbidden(message) => write!(f, "{}", message),
            ApiError::NotFound(what) => write!(f, "{} not found", what),
            ApiError::Internal(_) => write!(f, "Internal server error"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        let body = match &self {
            ApiError::MissingToken | ApiError::InvalidToken => json!({
                "error": message,
                "expired": false,
            }),
            ApiError::TokenExpired { expired_at } => json!({
                "error": message,
                "expired": true,
                "expiredAt": expired_at.to_rfc3339(),
            }),
            ApiError::Internal(err) => {
                error!("Unhandled error: {:#}", err);
                json!({ "error": message })
            }
            _ => json!({ "error": message }),
        };

        (status, Json(body)).into_response()
    }
}
