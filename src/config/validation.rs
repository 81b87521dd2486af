//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check provider-specific requirements (static tokens, API keys)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{AppConfig, AuthProvider};

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("`{}` is not a socket address", config.listener.bind_address),
        ));
    }

    let base_path = &config.api.base_path;
    if !base_path.is_empty() && (!base_path.starts_with('/') || base_path.ends_with('/')) {
        errors.push(ValidationError::new(
            "api.base_path",
            "must be empty or start with '/' and not end with '/'",
        ));
    }

    for origin in &config.cors.allowed_origins {
        if origin != "*" && url::Url::parse(origin).is_err() {
            errors.push(ValidationError::new("cors.allowed_origins", format!("`{}` is not a URL", origin)));
        }
    }

    match config.auth.provider {
        AuthProvider::Static => {
            let mut seen = HashSet::new();
            for entry in &config.auth.tokens {
                if entry.token.trim().is_empty() || entry.uid.trim().is_empty() {
                    errors.push(ValidationError::new("auth.tokens", "token and uid must be non-empty"));
                }
                if !seen.insert(entry.token.as_str()) {
                    errors.push(ValidationError::new("auth.tokens", "duplicate token entry"));
                }
            }
        }
        AuthProvider::IdentityToolkit => {
            if config.auth.api_key.is_empty() {
                errors.push(ValidationError::new("auth.api_key", "required for identity_toolkit"));
            }
            if url::Url::parse(&config.auth.endpoint).is_err() {
                errors.push(ValidationError::new("auth.endpoint", "must be a URL"));
            }
            if config.auth.timeout_secs == 0 {
                errors.push(ValidationError::new("auth.timeout_secs", "must be greater than zero"));
            }
        }
    }

    if config.store.snapshot_on_shutdown && config.store.seed_path.is_none() {
        errors.push(ValidationError::new(
            "store.snapshot_on_shutdown",
            "requires store.seed_path",
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than zero"));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be greater than zero"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("`{}` is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::StaticTokenConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = AppConfig::default();
        config.listener.bind_address = "nowhere".into();
        config.timeouts.request_secs = 0;
        config.api.base_path = "api/".into();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["listener.bind_address", "api.base_path", "timeouts.request_secs"]);
    }

    #[test]
    fn test_identity_toolkit_requires_api_key() {
        let mut config = AppConfig::default();
        config.auth.provider = AuthProvider::IdentityToolkit;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "auth.api_key");
    }

    #[test]
    fn test_duplicate_static_tokens_rejected() {
        let entry = StaticTokenConfig {
            token: "t".into(),
            uid: "u".into(),
            email: None,
            name: None,
            picture: None,
        };
        let mut config = AppConfig::default();
        config.auth.tokens = vec![entry.clone(), entry];
        assert!(validate_config(&config).is_err());
    }
}
