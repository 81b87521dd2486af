//! Route table.
//!
//! # Responsibilities
//! - Hold route definitions (method, pattern, handler, auth flag)
//! - Validate patterns once, at construction
//! - Resolve a request to the first route whose method and pattern match
//!
//! # Design Decisions
//! - Immutable after construction (shared across requests without locks)
//! - O(n) scan in declaration order; order is the only tie-break
//! - Explicit `None` for no match rather than a silent default route

use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use thiserror::Error;

use crate::context::AppContext;
use crate::error::HandlerResult;
use crate::http::request::{HttpRequest, Method};
use crate::routing::matcher::{PathParams, PathPattern};

pub type HandlerFuture = BoxFuture<'static, HandlerResult>;

/// A route handler stored as a first-class function.
pub type Handler = Arc<dyn Fn(AppContext, HttpRequest) -> HandlerFuture + Send + Sync>;

/// Wrap an async function into a [`Handler`].
pub fn handler<F, Fut>(f: F) -> Handler
where
    F: Fn(AppContext, HttpRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(move |ctx: AppContext, request: HttpRequest| -> HandlerFuture { Box::pin(f(ctx, request)) })
}

/// One entry of the route table.
#[derive(Clone)]
pub struct RouteDefinition {
    pub method: Method,
    pub pattern: PathPattern,
    pub handler: Handler,
    /// Run the authentication hook before the handler.
    pub requires_auth: bool,
}

impl RouteDefinition {
    pub fn new(method: Method, pattern: &str, handler: Handler) -> Self {
        Self {
            method,
            pattern: PathPattern::parse(pattern),
            handler,
            requires_auth: false,
        }
    }

    pub fn get(pattern: &str, handler: Handler) -> Self {
        Self::new(Method::Get, pattern, handler)
    }

    pub fn post(pattern: &str, handler: Handler) -> Self {
        Self::new(Method::Post, pattern, handler)
    }

    pub fn put(pattern: &str, handler: Handler) -> Self {
        Self::new(Method::Put, pattern, handler)
    }

    pub fn delete(pattern: &str, handler: Handler) -> Self {
        Self::new(Method::Delete, pattern, handler)
    }

    pub fn patch(pattern: &str, handler: Handler) -> Self {
        Self::new(Method::Patch, pattern, handler)
    }

    pub fn authenticated(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    /// Mount this route under `prefix`.
    pub fn nested(mut self, prefix: &str) -> Self {
        self.pattern = self.pattern.nested(prefix);
        self
    }
}

impl fmt::Debug for RouteDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDefinition")
            .field("method", &self.method)
            .field("pattern", &self.pattern.as_str())
            .field("requires_auth", &self.requires_auth)
            .finish_non_exhaustive()
    }
}

/// Route table construction errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteTableError {
    #[error("route {method} {pattern}: capture segment has an empty name")]
    EmptyCaptureName { method: Method, pattern: String },

    #[error("route {method} {pattern}: capture name `{name}` is used more than once")]
    DuplicateCapture {
        method: Method,
        pattern: String,
        name: String,
    },
}

/// An ordered, immutable list of routes.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<RouteDefinition>,
}

impl RouteTable {
    /// Build a table, rejecting degenerate patterns.
    pub fn new(routes: Vec<RouteDefinition>) -> Result<Self, RouteTableError> {
        for route in &routes {
            validate(route)?;
        }
        Ok(Self { routes })
    }

    /// Build a table with every pattern mounted under `prefix`.
    pub fn nested(prefix: &str, routes: Vec<RouteDefinition>) -> Result<Self, RouteTableError> {
        Self::new(routes.into_iter().map(|route| route.nested(prefix)).collect())
    }

    /// First route, in declaration order, matching `method` and `path`.
    pub fn resolve(&self, method: Method, path: &str) -> Option<(&RouteDefinition, PathParams)> {
        self.routes
            .iter()
            .filter(|route| route.method == method)
            .find_map(|route| {
                let result = route.pattern.match_path(path);
                result.matched.then_some((route, result.params))
            })
    }

    pub fn routes(&self) -> &[RouteDefinition] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

fn validate(route: &RouteDefinition) -> Result<(), RouteTableError> {
    let mut seen = HashSet::new();
    for name in route.pattern.capture_names() {
        if name.is_empty() {
            return Err(RouteTableError::EmptyCaptureName {
                method: route.method,
                pattern: route.pattern.to_string(),
            });
        }
        if !seen.insert(name) {
            return Err(RouteTableError::DuplicateCapture {
                method: route.method,
                pattern: route.pattern.to_string(),
                name: name.to_string(),
            });
        }
    }
    Ok(())
}
