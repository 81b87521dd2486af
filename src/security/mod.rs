//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → cors.rs (preflight short-circuit, origin allow-list)
//!     → body limit (tower-http, server adapter) / conversion limit (serverless)
//!     → Pass to dispatcher
//! ```
//!
//! # Design Decisions
//! - Both adapters share one CorsPolicy
//! - No trust in client input: bodies are size-capped before parsing

pub mod cors;

pub use cors::{cors_middleware, CorsPolicy, ALLOW_HEADERS, ALLOW_METHODS};
