//! Gift-sharing marketplace API library

pub mod auth;
pub mod config;
pub mod context;
pub mod error;
pub mod handlers;
pub mod http;
pub mod lifecycle;
pub mod models;
pub mod observability;
pub mod routing;
pub mod security;
pub mod store;

pub use config::schema::AppConfig;
pub use context::AppContext;
pub use error::{ApiError, HandlerResult};
pub use http::{FunctionHandler, HttpServer};
pub use lifecycle::{Application, Shutdown};
pub use routing::Dispatcher;
