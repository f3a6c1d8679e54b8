//! Chaos demo: an instrumented HTTP API with fault injection.
//!
//! Library side of the `chaos-demo`, `alert-logger`, `loadgen` and
//! `chaos-cli` binaries.

pub mod alerts;
pub mod chaos;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod loadgen;
pub mod observability;

pub use chaos::{ChaosSettings, ChaosState};
pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use observability::MetricsSink;
