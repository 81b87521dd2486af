//! Cross-origin policy shared by both host adapters.
//!
//! # Responsibilities
//! - Echo the request `Origin` when it is on the allow-list
//! - Emit the fixed allow-methods / allow-headers / credentials headers
//! - Short-circuit preflight (`OPTIONS`) requests with an empty 204
//!
//! # Design Decisions
//! - One policy value is built at startup and handed to whichever adapter runs
//! - Origins not on the list get no `Access-Control-Allow-Origin` at all

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN, VARY,
        },
        HeaderMap, HeaderValue, Method, Request, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::CorsConfig;

pub const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, PATCH, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// Allow-list based CORS policy.
#[derive(Debug, Clone, Default)]
pub struct CorsPolicy {
    allowed_origins: Vec<String>,
}

impl CorsPolicy {
    pub fn new(allowed_origins: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            allowed_origins: allowed_origins.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &CorsConfig) -> Self {
        Self::new(config.allowed_origins.iter().cloned())
    }

    /// The origin to echo back, if the request's origin is allowed.
    pub fn allowed_origin<'a>(&self, headers: &'a HeaderMap) -> Option<&'a HeaderValue> {
        let origin = headers.get(ORIGIN)?;
        let value = origin.to_str().ok()?;
        self.allowed_origins
            .iter()
            .any(|allowed| allowed == "*" || allowed == value)
            .then_some(origin)
    }

    /// Add the CORS headers for a request carrying `request_headers`.
    pub fn decorate(&self, request_headers: &HeaderMap, response_headers: &mut HeaderMap) {
        if let Some(origin) = self.allowed_origin(request_headers) {
            response_headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
        }
        response_headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOW_METHODS));
        response_headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOW_HEADERS));
        response_headers.insert(ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true"));
        response_headers.append(VARY, HeaderValue::from_static("Origin"));
    }

    /// Empty 204 answer to a preflight request.
    pub fn preflight(&self, request_headers: &HeaderMap) -> Response {
        let mut response = StatusCode::NO_CONTENT.into_response();
        self.decorate(request_headers, response.headers_mut());
        response
    }
}

/// Middleware applying the policy in front of the long-running server.
pub async fn cors_middleware(State(policy): State<Arc<CorsPolicy>>, req: Request<Body>, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        return policy.preflight(req.headers());
    }

    let request_headers = req.headers().clone();
    let mut response = next.run(req).await;
    policy.decorate(&request_headers, response.headers_mut());
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with_origin(origin: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ORIGIN, HeaderValue::from_str(origin).unwrap());
        headers
    }

    #[test]
    fn test_allowed_origin_is_echoed() {
        let policy = CorsPolicy::new(["http://localhost:3000"]);
        let mut out = HeaderMap::new();
        policy.decorate(&headers_with_origin("http://localhost:3000"), &mut out);

        assert_eq!(out[ACCESS_CONTROL_ALLOW_ORIGIN], "http://localhost:3000");
        assert_eq!(out[ACCESS_CONTROL_ALLOW_METHODS], ALLOW_METHODS);
        assert_eq!(out[ACCESS_CONTROL_ALLOW_HEADERS], ALLOW_HEADERS);
        assert_eq!(out[ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    }

    #[test]
    fn test_unknown_origin_is_not_echoed() {
        let policy = CorsPolicy::new(["http://localhost:3000"]);
        let mut out = HeaderMap::new();
        policy.decorate(&headers_with_origin("https://evil.example"), &mut out);

        assert!(out.get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
        assert_eq!(out[ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    }

    #[test]
    fn test_wildcard_allows_any_origin() {
        let policy = CorsPolicy::new(["*"]);
        assert!(policy.allowed_origin(&headers_with_origin("https://a.example")).is_some());
        assert!(policy.allowed_origin(&HeaderMap::new()).is_none());
    }

    #[test]
    fn test_preflight_is_empty_204() {
        let policy = CorsPolicy::new(["http://localhost:3000"]);
        let response = policy.preflight(&headers_with_origin("http://localhost:3000"));
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "http://localhost:3000");
    }
}
