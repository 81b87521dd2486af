//! Long-running HTTP server adapter.
//!
//! # Responsibilities
//! - Create the Axum Router with a single catch-all handler
//! - Wire up middleware (CORS, request ID, tracing)
//! - Hand native requests to the shared entry path
//! - Serve until the shutdown coordinator fires
//!
//! # Design Decisions
//! - Axum does no path matching of its own here: the route table is the only
//!   matcher, so both adapters resolve routes identically
//! - Body limit and deadline are enforced in `entry.rs`, not by tower-http
//!   layers, so their rejections carry the same `{error}` body as the
//!   serverless adapter's

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::http::entry::{dispatch_native, RequestLimits};
use crate::lifecycle::ShutdownSignal;
use crate::routing::Dispatcher;
use crate::security::{cors_middleware, CorsPolicy};

/// Application state injected into the catch-all handler.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub limits: RequestLimits,
}

/// HTTP server hosting the dispatcher.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server around `dispatcher`.
    pub fn new(dispatcher: Dispatcher, cors: CorsPolicy, config: &AppConfig) -> Self {
        let state = AppState {
            dispatcher,
            limits: RequestLimits::from_config(config),
        };
        let router = Self::build_router(Arc::new(cors), state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(cors: Arc<CorsPolicy>, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(dispatch_handler))
            .route("/", any(dispatch_handler))
            .with_state(state)
            .layer(middleware::from_fn_with_state(cors, cors_middleware))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    pub fn into_router(self) -> Router {
        self.router
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener, shutdown: ShutdownSignal) -> Result<(), std::io::Error> {
        serve(self.router, listener, shutdown).await
    }
}

/// Serve `router` on `listener` until `shutdown` fires.
pub async fn serve(
    router: Router,
    listener: TcpListener,
    shutdown: ShutdownSignal,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "HTTP server starting");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown.triggered().await;
            tracing::info!("Shutdown signal received, draining connections");
        })
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Catch-all handler: native request → shared entry path → native response.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    tracing::debug!(
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
        "Dispatching request"
    );

    dispatch_native(&state.dispatcher, request, state.limits)
        .await
        .into_response()
}
