//! Serverless single-entry adapter.
//!
//! Every request arrives through one entry point regardless of path. The
//! handler applies the shared CORS policy, answers preflight requests itself
//! and dispatches everything else through the route table.

use std::convert::Infallible;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::{Method, Request},
    response::{IntoResponse, Response},
    Router,
};
use futures_util::future::BoxFuture;
use tower::Service;
use tower_http::trace::TraceLayer;

use crate::http::entry::{dispatch_native, RequestLimits};
use crate::routing::Dispatcher;
use crate::security::CorsPolicy;

/// A cloneable `tower::Service` wrapping the dispatcher.
#[derive(Clone)]
pub struct FunctionHandler {
    dispatcher: Dispatcher,
    cors: CorsPolicy,
    limits: RequestLimits,
}

impl FunctionHandler {
    pub fn new(dispatcher: Dispatcher, cors: CorsPolicy, limits: RequestLimits) -> Self {
        Self {
            dispatcher,
            cors,
            limits,
        }
    }

    /// Handle one invocation.
    pub async fn handle(&self, request: Request<Body>) -> Response {
        let request_headers = request.headers().clone();
        if request.method() == Method::OPTIONS {
            return self.cors.preflight(&request_headers);
        }

        let mut response = dispatch_native(&self.dispatcher, request, self.limits)
            .await
            .into_response();
        self.cors.decorate(&request_headers, response.headers_mut());
        response
    }

    /// Host the function as the sole fallback of an otherwise empty router.
    pub fn into_router(self) -> Router {
        Router::new()
            .fallback_service(self)
            .layer(TraceLayer::new_for_http())
    }
}

impl Service<Request<Body>> for FunctionHandler {
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Response, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let handler = self.clone();
        Box::pin(async move { Ok(handler.handle(request).await) })
    }
}
