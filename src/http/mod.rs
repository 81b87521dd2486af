//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Native request (axum / tower)
//!     → server.rs (long-running) or function.rs (serverless entry)
//!     → entry.rs (size limit, deadline)
//!     → request.rs (method, url, headers, buffered body → HttpRequest)
//!     → routing::Dispatcher (match, then JSON decode)
//!     → response.rs (HttpResponse → status, headers, JSON body)
//!     → Send to client
//! ```

pub mod entry;
pub mod function;
pub mod request;
pub mod response;
pub mod server;

pub use entry::{dispatch_native, RequestLimits};
pub use function::FunctionHandler;
pub use request::{HttpRequest, Method, RequestError};
pub use response::HttpResponse;
pub use server::{serve, AppState, HttpServer};
