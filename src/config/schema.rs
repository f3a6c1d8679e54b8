//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the demo API.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Service identity used in metric labels and trace resources.
    pub service: ServiceConfig,

    /// Logging and trace export settings.
    pub telemetry: TelemetryConfig,

    /// Transport-level timeouts.
    pub timeouts: TimeoutConfig,

    /// Chaos settings applied at startup.
    pub chaos: ChaosConfig,

    /// Simulated downstream dependency used by `/api/db`.
    pub downstream: DownstreamConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "api".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format `{other}`")),
        }
    }
}

/// Telemetry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// OTLP/HTTP collector base URL; `/v1/traces` is appended.
    pub otlp_endpoint: Option<String>,

    /// Export spans to the collector.
    pub traces_enabled: bool,

    /// Default `EnvFilter` directives when `RUST_LOG` is unset.
    pub log_filter: String,

    pub log_format: LogFormat,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            otlp_endpoint: Some("http://otel-collector:4318".to_string()),
            traces_enabled: true,
            log_filter: "chaos_demo=info,tower_http=info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout enforced by the transport layer, in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Initial chaos settings. Clamped like runtime writes.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ChaosConfig {
    pub latency_ms: i64,
    pub error_rate: f64,
}

/// Bounds of the uniformly sampled delay in `/api/db`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DownstreamConfig {
    pub min_delay_secs: f64,
    pub max_delay_secs: f64,
}

impl Default for DownstreamConfig {
    fn default() -> Self {
        Self {
            min_delay_secs: 0.02,
            max_delay_secs: 0.25,
        }
    }
}
