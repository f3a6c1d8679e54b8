//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: defaults, then the optional TOML file, then the
/// process environment. The result is validated before it is returned.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Same as [`load_config`] with an injectable environment lookup.
pub fn load_config_with_env<F>(path: Option<&Path>, env: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => AppConfig::default(),
    };

    let mut errors = apply_env_overrides(&mut config, env);
    if let Err(invalid) = validate_config(&config) {
        errors.extend(invalid);
    }
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors));
    }

    Ok(config)
}

/// Environment variables understood on top of the file:
/// `SERVICE_NAME`, `OTEL_EXPORTER_OTLP_ENDPOINT` (empty disables export),
/// `BIND_ADDRESS`, or `HOST`/`PORT`, and `LOG_FORMAT`.
///
/// Values that cannot be applied are returned instead of being dropped.
pub fn apply_env_overrides<F>(config: &mut AppConfig, env: F) -> Vec<ValidationError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut errors = Vec::new();

    if let Some(name) = env("SERVICE_NAME") {
        config.service.name = name;
    }

    if let Some(endpoint) = env("OTEL_EXPORTER_OTLP_ENDPOINT") {
        config.telemetry.otlp_endpoint = (!endpoint.trim().is_empty()).then_some(endpoint);
    }

    if let Some(addr) = env("BIND_ADDRESS") {
        config.listener.bind_address = addr;
    } else if env("HOST").is_some() || env("PORT").is_some() {
        let (default_host, default_port) = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(h, p)| (h.to_string(), p.to_string()))
            .unwrap_or_else(|| ("0.0.0.0".to_string(), "8080".to_string()));
        let host = env("HOST").unwrap_or(default_host);
        let port = env("PORT").unwrap_or(default_port);
        config.listener.bind_address = format!("{host}:{port}");
    }

    if let Some(format) = env("LOG_FORMAT") {
        match format.parse() {
            Ok(format) => config.telemetry.log_format = format,
            Err(e) => errors.push(ValidationError::new("telemetry.log_format", e)),
        }
    }

    errors
}
