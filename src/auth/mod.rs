//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! Matched route with requires_auth
//!     → hook.rs (extract `Bearer <token>`)
//!     → verifier.rs (TokenVerifier: static table or identity provider)
//!     → request.user = Some(Identity) | None
//!     → handler re-checks and answers 401 when it needs a caller
//! ```
//!
//! # Design Decisions
//! - The hook never fails the pipeline; failures degrade to anonymous
//! - Verifiers are built at startup and shared through `AppContext`

pub mod hook;
pub mod verifier;

pub use hook::{authenticate, bearer_token};
pub use verifier::{build_verifier, Identity, IdentityToolkitVerifier, StaticTokenVerifier, TokenVerifier, VerifyError};
