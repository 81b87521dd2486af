//! Native entry path shared by both host adapters.
//!
//! Conversion, the body size limit and the request deadline live here so a
//! request gets the same status and `{error}` body whichever adapter hosts
//! the dispatcher.

use std::time::Duration;

use axum::{body::Body, http::Request, http::StatusCode};

use crate::config::AppConfig;
use crate::http::request::HttpRequest;
use crate::http::response::HttpResponse;
use crate::routing::Dispatcher;

/// Per-request limits applied before and during dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLimits {
    pub max_body_size: usize,
    pub timeout: Duration,
}

impl RequestLimits {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_body_size: config.security.max_body_size,
            timeout: Duration::from_secs(config.timeouts.request_secs),
        }
    }
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// Convert `request` and dispatch it, all within `limits.timeout`.
pub async fn dispatch_native(dispatcher: &Dispatcher, request: Request<Body>, limits: RequestLimits) -> HttpResponse {
    let handled = async {
        match HttpRequest::from_native(request, limits.max_body_size).await {
            Ok(request) => dispatcher.dispatch(request).await,
            Err(e) => {
                tracing::warn!(error = %e, "Rejected request during conversion");
                HttpResponse::from(e)
            }
        }
    };

    match tokio::time::timeout(limits.timeout, handled).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(timeout_secs = limits.timeout.as_secs(), "Request timed out");
            HttpResponse::error(StatusCode::REQUEST_TIMEOUT, "Request timeout")
        }
    }
}
