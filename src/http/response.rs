//! Adapter-independent response model.
//!
//! # Responsibilities
//! - Define the `HttpResponse` handlers return
//! - Provide the fixed error-shaped bodies (`{"error": string}`)
//! - Convert into a native axum response for either host adapter

use axum::http::{header::HeaderName, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

/// Message used for every unmatched route.
pub const ROUTE_NOT_FOUND: &str = "Route not found";

/// Message used whenever an internal failure crosses the dispatcher.
pub const INTERNAL_SERVER_ERROR: &str = "Internal server error";

/// A handler's response. The status is always set.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl HttpResponse {
    pub fn new(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body,
        }
    }

    pub fn ok(body: Value) -> Self {
        Self::new(StatusCode::OK, body)
    }

    pub fn created(body: Value) -> Self {
        Self::new(StatusCode::CREATED, body)
    }

    /// An error-shaped response: `{"error": message}`.
    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status, json!({ "error": message.into() }))
    }

    pub fn route_not_found() -> Self {
        Self::error(StatusCode::NOT_FOUND, ROUTE_NOT_FOUND)
    }

    pub fn internal_error() -> Self {
        Self::error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR)
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// The `error` message, if this is an error-shaped body.
    pub fn error_message(&self) -> Option<&str> {
        self.body.get("error").and_then(Value::as_str)
    }
}

impl IntoResponse for HttpResponse {
    fn into_response(self) -> Response {
        (self.status, self.headers, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};

    #[test]
    fn test_error_shape() {
        let response = HttpResponse::route_not_found();
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.body, json!({ "error": "Route not found" }));
        assert_eq!(response.error_message(), Some(ROUTE_NOT_FOUND));
    }

    #[tokio::test]
    async fn test_into_response_applies_headers_and_json() {
        let response = HttpResponse::ok(json!({ "status": "ok" }))
            .with_header(CACHE_CONTROL, HeaderValue::from_static("no-store"))
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CACHE_CONTROL], "no-store");
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "status": "ok" }));
    }
}
