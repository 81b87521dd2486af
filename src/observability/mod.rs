//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! dispatcher, auth hook, adapters
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Prometheus scrape endpoint
//! ```

pub mod logging;
pub mod metrics;
