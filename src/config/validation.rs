//! Configuration validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Chaos values are clamped rather than rejected, except non-finite ones

use std::net::SocketAddr;

use crate::config::schema::AppConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub(crate) fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("`{}` is not a socket address", config.listener.bind_address),
        ));
    }

    if config.service.name.trim().is_empty() {
        errors.push(ValidationError::new("service.name", "must not be empty"));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    if !config.chaos.error_rate.is_finite() {
        errors.push(ValidationError::new("chaos.error_rate", "must be a finite number"));
    }

    let downstream = &config.downstream;
    if !(downstream.min_delay_secs.is_finite() && downstream.max_delay_secs.is_finite()) {
        errors.push(ValidationError::new(
            "downstream",
            format!(
                "delays must be finite, got {} and {}",
                downstream.min_delay_secs, downstream.max_delay_secs
            ),
        ));
    } else if !(downstream.min_delay_secs >= 0.0
        && downstream.min_delay_secs <= downstream.max_delay_secs)
    {
        errors.push(ValidationError::new(
            "downstream",
            format!(
                "expected 0 <= min_delay_secs <= max_delay_secs, got {} and {}",
                downstream.min_delay_secs, downstream.max_delay_secs
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
