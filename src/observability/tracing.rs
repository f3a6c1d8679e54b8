//! Distributed tracing export.
//!
//! # Responsibilities
//! - Build the OpenTelemetry tracer provider once at startup
//! - Batch finished spans and push them over OTLP/HTTP to the collector
//! - Flush pending spans on shutdown
//!
//! Spans themselves are created with the `tracing` macros; the
//! `tracing-opentelemetry` layer installed by [`super::logging`] turns them
//! into OTel spans owned by this provider.

use opentelemetry_otlp::{SpanExporter, WithExportConfig};
use opentelemetry_sdk::{trace::SdkTracerProvider, Resource};

use crate::config::TelemetryConfig;

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("failed to build OTLP span exporter: {0}")]
    Exporter(#[from] opentelemetry_otlp::ExporterBuildError),

    #[error("failed to initialise tracing subscriber: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
}

/// Full URL of the OTLP/HTTP traces endpoint for a collector base URL.
pub fn traces_endpoint(base: &str) -> String {
    format!("{}/v1/traces", base.trim_end_matches('/'))
}

/// Build the tracer provider, or `None` when export is disabled.
pub fn init_tracer_provider(
    service_name: &str,
    config: &TelemetryConfig,
) -> Result<Option<SdkTracerProvider>, TelemetryError> {
    let endpoint = match config.otlp_endpoint.as_deref() {
        Some(endpoint) if config.traces_enabled && !endpoint.is_empty() => endpoint,
        _ => return Ok(None),
    };

    let exporter = SpanExporter::builder()
        .with_http()
        .with_endpoint(traces_endpoint(endpoint))
        .build()?;

    let resource = Resource::builder()
        .with_service_name(service_name.to_string())
        .build();

    let provider = SdkTracerProvider::builder()
        .with_resource(resource)
        .with_batch_exporter(exporter)
        .build();

    Ok(Some(provider))
}

/// Flush and stop the provider. Export failures at this point are only logged.
pub fn shutdown_tracer_provider(provider: SdkTracerProvider) {
    if let Err(e) = provider.shutdown() {
        tracing::warn!(error = %e, "Tracer provider shutdown failed");
    } else {
        tracing::info!("Tracer provider shut down");
    }
}
