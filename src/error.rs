//! API error taxonomy.
//!
//! Handlers return `Result<HttpResponse, ApiError>`. Every variant renders
//! to an error-shaped response; `Internal` logs its cause and exposes only
//! its fixed message.

use axum::http::StatusCode;
use thiserror::Error;

use crate::http::response::HttpResponse;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Expected handler failures, mapped onto HTTP status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No such record (404).
    #[error("{0}")]
    NotFound(String),

    /// Missing or invalid credentials on a route that checks them (401).
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not entitled (403).
    #[error("{0}")]
    Forbidden(String),

    /// Missing or malformed input (400).
    #[error("{0}")]
    BadRequest(String),

    /// Business-rule violation such as claiming an unavailable item (400).
    #[error("{0}")]
    InvalidState(String),

    /// Collaborator failure (500). The source is logged, never returned.
    #[error("{message}")]
    Internal {
        message: String,
        #[source]
        source: BoxError,
    },
}

pub type HandlerResult = Result<HttpResponse, ApiError>;

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// The response every auth-checking handler returns without an identity.
    pub fn authentication_required() -> Self {
        Self::Unauthorized("Authentication required".to_string())
    }

    pub fn internal(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Internal {
            message: message.into(),
            source: source.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) | ApiError::InvalidState(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ApiError> for HttpResponse {
    fn from(err: ApiError) -> Self {
        if let ApiError::Internal { message, source } = &err {
            tracing::error!(error = %source, "{}", message);
        }
        HttpResponse::error(err.status(), err.to_string())
    }
}
