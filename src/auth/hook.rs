//! Per-route authentication hook.
//!
//! Runs before the handler of every route flagged `requires_auth`. On
//! success the request's identity slot is filled; on any failure the request
//! continues anonymously and the handler decides whether that is acceptable.

use axum::http::{header::AUTHORIZATION, HeaderMap};

use crate::auth::verifier::TokenVerifier;
use crate::http::request::HttpRequest;
use crate::observability::metrics;

const BEARER_PREFIX: &str = "Bearer ";

/// Extract the token from the first `Authorization: Bearer <token>` value.
///
/// Any other shape (missing header, other scheme, empty token, non-ASCII)
/// counts as no token.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Populate `request.user` from its bearer token, degrading to anonymous.
pub async fn authenticate(verifier: &dyn TokenVerifier, mut request: HttpRequest) -> HttpRequest {
    let token = match bearer_token(&request.headers) {
        Some(token) => token.to_string(),
        None => {
            tracing::debug!(path = %request.path(), "No bearer token, continuing anonymously");
            metrics::record_auth_failure("missing_token");
            return request;
        }
    };

    match verifier.verify(&token).await {
        Ok(identity) => {
            tracing::debug!(uid = %identity.uid, "Request authenticated");
            request.user = Some(identity);
        }
        Err(e) => {
            let prefix: String = token.chars().take(10).collect();
            tracing::warn!(error = %e, token_prefix = %prefix, "Token verification failed, continuing anonymously");
            metrics::record_auth_failure(e.reason());
        }
    }

    request
}
