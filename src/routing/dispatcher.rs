//! Request dispatch.
//!
//! # State Machine
//! ```text
//! Received ──match──▶ Matched ──requires_auth?──▶ Authenticated | Anonymous
//!    │                   │                               │
//!    │                   └──body not JSON──▶ 400         ▼
//!    └──no route──▶ Unmatched (404)            Handled ──▶ Responded
//!
//! Any panic while authenticating or handling ──▶ Errored (500)
//! ```
//!
//! # Design Decisions
//! - One dispatcher serves both host adapters, so dispatch semantics never
//!   depend on the hosting environment
//! - The dispatcher does not reject anonymous calls to auth routes; it only
//!   guarantees the hook ran before the handler
//! - Internal causes are logged, never returned to the caller

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures_util::FutureExt;

use crate::auth::authenticate;
use crate::context::AppContext;
use crate::error::HandlerResult;
use crate::http::request::HttpRequest;
use crate::http::response::HttpResponse;
use crate::observability::metrics;
use crate::routing::router::{RouteDefinition, RouteTable};

/// Selects a route, runs the auth hook if needed, and invokes the handler.
#[derive(Clone)]
pub struct Dispatcher {
    table: Arc<RouteTable>,
    context: AppContext,
}

impl Dispatcher {
    pub fn new(table: RouteTable, context: AppContext) -> Self {
        Self {
            table: Arc::new(table),
            context,
        }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    /// Dispatch one request to completion. Never fails.
    pub async fn dispatch(&self, mut request: HttpRequest) -> HttpResponse {
        let start = Instant::now();
        let method = request.method;
        let path = request.path().to_string();

        let Some((route, params)) = self.table.resolve(method, &path) else {
            tracing::warn!(method = %method, path = %path, "No route matched");
            let response = HttpResponse::route_not_found();
            metrics::record_request(method.as_str(), metrics::UNMATCHED_ROUTE, response.status.as_u16(), start);
            return response;
        };

        request.params = params;
        if let Err(err) = request.decode_body() {
            let response = HttpResponse::from(err);
            metrics::record_request(method.as_str(), route.pattern.as_str(), response.status.as_u16(), start);
            return response;
        }
        tracing::debug!(
            method = %method,
            path = %path,
            route = %route.pattern,
            requires_auth = route.requires_auth,
            "Route matched"
        );

        let outcome = AssertUnwindSafe(self.handle(route, request)).catch_unwind().await;
        let response = match outcome {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => HttpResponse::from(err),
            Err(panic) => {
                tracing::error!(
                    method = %method,
                    path = %path,
                    route = %route.pattern,
                    cause = %panic_message(panic.as_ref()),
                    "Handler panicked"
                );
                HttpResponse::internal_error()
            }
        };

        tracing::debug!(
            method = %method,
            route = %route.pattern,
            status = response.status.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Request handled"
        );
        metrics::record_request(method.as_str(), route.pattern.as_str(), response.status.as_u16(), start);
        response
    }

    async fn handle(&self, route: &RouteDefinition, request: HttpRequest) -> HandlerResult {
        let request = if route.requires_auth {
            authenticate(self.context.verifier.as_ref(), request).await
        } else {
            request
        };
        (route.handler)(self.context.clone(), request).await
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
