//! Adapter-independent request model.
//!
//! # Responsibilities
//! - Define the `HttpRequest` every host adapter produces
//! - Translate a native axum/hyper request into it (method, url, headers,
//!   query, buffered body)
//!
//! # Design Decisions
//! - Only structural validation happens here; handlers validate semantics
//! - The body is buffered at conversion but decoded as JSON only after a
//!   route matched, so an unmatched path is a 404 whatever its body
//! - Path parameters stay empty until the dispatcher has matched a route
//! - The identity slot stays empty until the authentication hook runs

use std::collections::HashMap;
use std::fmt;

use axum::body::{Body, Bytes};
use axum::http::{header::HeaderName, HeaderMap, HeaderValue, Request, StatusCode};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::auth::Identity;
use crate::http::response::HttpResponse;
use crate::routing::matcher::PathParams;

/// HTTP methods a route can be declared for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&axum::http::Method> for Method {
    type Error = RequestError;

    fn try_from(method: &axum::http::Method) -> Result<Self, Self::Error> {
        match *method {
            axum::http::Method::GET => Ok(Method::Get),
            axum::http::Method::POST => Ok(Method::Post),
            axum::http::Method::PUT => Ok(Method::Put),
            axum::http::Method::DELETE => Ok(Method::Delete),
            axum::http::Method::PATCH => Ok(Method::Patch),
            _ => Err(RequestError::UnsupportedMethod(method.to_string())),
        }
    }
}

/// Errors raised while translating a native request.
#[derive(Debug, Error)]
pub enum RequestError {
    /// No route can ever be declared for this method.
    #[error("unsupported method {0}")]
    UnsupportedMethod(String),

    /// The body exceeded the configured size limit.
    #[error("request body exceeds {limit} bytes")]
    TooLarge { limit: usize },

    /// The body could not be read.
    #[error("failed to read request body: {0}")]
    Body(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The body was present but not valid JSON.
    #[error("invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

impl From<RequestError> for HttpResponse {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::UnsupportedMethod(method) => {
                tracing::debug!(method = %method, "Unsupported method");
                HttpResponse::route_not_found()
            }
            RequestError::TooLarge { limit } => {
                tracing::warn!(limit, "Rejected oversized request body");
                HttpResponse::error(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large")
            }
            RequestError::Body(e) => {
                tracing::warn!(error = %e, "Failed to read request body");
                HttpResponse::error(StatusCode::BAD_REQUEST, "Invalid request body")
            }
            RequestError::InvalidJson(e) => {
                tracing::debug!(error = %e, "Rejected malformed JSON body");
                HttpResponse::error(StatusCode::BAD_REQUEST, "Invalid JSON body")
            }
        }
    }
}

/// A request as seen by the dispatcher and handlers.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    /// Path plus optional query string, as received.
    pub url: String,
    pub headers: HeaderMap,
    /// Decoded JSON body; filled by `decode_body` once a route matched.
    pub body: Option<Value>,
    /// Bytes buffered by the host adapter, not yet decoded.
    pub raw_body: Bytes,
    /// Filled by the dispatcher after a successful match.
    pub params: PathParams,
    pub query: HashMap<String, String>,
    /// Filled by the authentication hook on successful verification.
    pub user: Option<Identity>,
}

impl HttpRequest {
    /// Build a request for `url`, parsing its query string.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        let url = url.into();
        let query = parse_query(&url);
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
            raw_body: Bytes::new(),
            params: PathParams::new(),
            query,
            user: None,
        }
    }

    /// Translate a native request, buffering at most `body_limit` bytes.
    pub async fn from_native(request: Request<Body>, body_limit: usize) -> Result<Self, RequestError> {
        let (parts, body) = request.into_parts();
        let method = Method::try_from(&parts.method)?;

        let url = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| parts.uri.path().to_string());

        let raw_body = Limited::new(body, body_limit)
            .collect()
            .await
            .map_err(|e| {
                if e.downcast_ref::<LengthLimitError>().is_some() {
                    RequestError::TooLarge { limit: body_limit }
                } else {
                    RequestError::Body(e)
                }
            })?
            .to_bytes();

        let mut request = Self::new(method, url);
        request.headers = parts.headers;
        request.raw_body = raw_body;
        Ok(request)
    }

    /// Decode the buffered bytes as JSON. Blank bytes leave `body` as is.
    pub fn decode_body(&mut self) -> Result<(), RequestError> {
        let raw = std::mem::take(&mut self.raw_body);
        if !raw.iter().all(u8::is_ascii_whitespace) {
            self.body = Some(serde_json::from_slice(&raw)?);
        }
        Ok(())
    }

    /// The path component of the url.
    pub fn path(&self) -> &str {
        match self.url.split_once('?') {
            Some((path, _)) => path,
            None => &self.url,
        }
    }

    /// First value of a header, if it is valid visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.user.as_ref()
    }

    pub fn with_header(mut self, name: HeaderName, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.append(name, value);
        }
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

fn parse_query(url: &str) -> HashMap<String, String> {
    match url.split_once('?') {
        Some((_, query)) => url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect(),
        None => HashMap::new(),
    }
}
