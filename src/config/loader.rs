//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{AdapterKind, AppConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid environment variable {name}: {message}")]
    Env { name: &'static str, message: String },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// Load and validate configuration from a TOML file.
///
/// Environment overrides are applied after parsing and before validation.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    finish(config, |name| std::env::var(name).ok())
}

/// Build a configuration from defaults and the environment only.
pub fn load_from_env() -> Result<AppConfig, ConfigError> {
    finish(AppConfig::default(), |name| std::env::var(name).ok())
}

fn finish(mut config: AppConfig, env: impl Fn(&str) -> Option<String>) -> Result<AppConfig, ConfigError> {
    apply_env_overrides(&mut config, env)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply `HOST`, `PORT`, `CLIENT_URL` and `ADAPTER_TYPE` on top of `config`.
pub fn apply_env_overrides(
    config: &mut AppConfig,
    env: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    let host = env("HOST");
    let port = env("PORT");
    if host.is_some() || port.is_some() {
        let (current_host, current_port) = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(h, p)| (h.to_string(), p.to_string()))
            .unwrap_or_else(|| (config.listener.bind_address.clone(), "8000".to_string()));
        if let Some(port) = &port {
            port.parse::<u16>().map_err(|e| ConfigError::Env {
                name: "PORT",
                message: e.to_string(),
            })?;
        }
        config.listener.bind_address = format!(
            "{}:{}",
            host.unwrap_or(current_host),
            port.unwrap_or(current_port)
        );
    }

    if let Some(client_url) = env("CLIENT_URL") {
        if !config.cors.allowed_origins.contains(&client_url) {
            config.cors.allowed_origins.push(client_url);
        }
    }

    if let Some(adapter) = env("ADAPTER_TYPE") {
        config.adapter = adapter
            .parse::<AdapterKind>()
            .map_err(|message| ConfigError::Env {
                name: "ADAPTER_TYPE",
                message,
            })?;
    }

    Ok(())
}
