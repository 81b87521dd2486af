//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML), optional
//!     → loader.rs (parse & deserialize)
//!     → environment overrides (HOST, PORT, CLIENT_URL, ADAPTER_TYPE)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_from_env, ConfigError};
pub use schema::{
    AdapterKind, ApiConfig, AppConfig, AuthConfig, AuthProvider, CorsConfig, ListenerConfig,
    LogFormat, ObservabilityConfig, SecurityConfig, StaticTokenConfig, StoreConfig, TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
