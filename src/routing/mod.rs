//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! HttpRequest (method, path)
//!     → router.rs (scan the route table in declaration order)
//!     → matcher.rs (segment-wise pattern match, capture binding)
//!     → dispatcher.rs (auth hook if required → handler → HttpResponse)
//!
//! Route table construction (at startup):
//!     RouteDefinition[]
//!     → compile patterns
//!     → reject empty or duplicate capture names
//!     → freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes are declared statically and never change at runtime
//! - Deterministic: the same request always resolves to the same route
//! - First match wins

pub mod dispatcher;
pub mod matcher;
pub mod router;

pub use dispatcher::Dispatcher;
pub use matcher::{match_path, PathMatch, PathParams, PathPattern};
pub use router::{handler, Handler, RouteDefinition, RouteTable, RouteTableError};
