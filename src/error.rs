//! Service error taxonomy.
//!
//! Every failure that reaches the HTTP boundary is a [`ServiceError`]. The
//! variant decides the status code; the message is returned verbatim in the
//! `error` field of the response body.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::gateway::types::ApiResponse;
use crate::store::StoreError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Missing, malformed or unverifiable credential (401)
    #[error("{0}")]
    Unauthenticated(String),

    /// Authenticated but not on the owner allowlist (403)
    #[error("{0}")]
    Forbidden(String),

    /// Bad or missing fields, unsupported action or status (400)
    #[error("{0}")]
    InvalidArgument(String),

    /// Target row does not exist (404)
    #[error("{0}")]
    NotFound(String),

    /// Backend or client could not be reached or initialised (500)
    #[error("{0}")]
    Unavailable(String),

    /// Unexpected backend failure (500)
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Error name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Unauthenticated(_) => "UNAUTHENTICATED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Unavailable(_) => "UNAVAILABLE",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unavailable(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.http_status().is_server_error()
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Http(ref e) if e.is_connect() || e.is_timeout() => {
                Self::Unavailable(err.to_string())
            }
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.http_status();
        (status, Json(ApiResponse::error(self.to_string()))).into_response()
    }
}
