//! Chaos demo API server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ transport layers ──▶ chaos pipeline ──▶ handlers
//!                     (request id,         (latency, timing,   (hello, db,
//!                      access span)         panic capture,      chaos control,
//!                                          timeout, metrics)   healthz, metrics)
//!                                                │
//!                         ChaosState ◀───────────┘ read per request,
//!                                                  written by /api/chaos/*
//!
//!     Exports: GET /metrics (pull), OTLP/HTTP spans (push, batched)
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use chaos_demo::config::load_config;
use chaos_demo::observability::{logging, tracing as otel};
use chaos_demo::{HttpServer, MetricsSink, Shutdown};

#[derive(Parser)]
#[command(name = "chaos-demo")]
#[command(about = "Instrumented demo API with chaos injection", long_about = None)]
struct Cli {
    /// Optional TOML configuration file.
    #[arg(short, long, env = "CHAOS_DEMO_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    let provider = otel::init_tracer_provider(&config.service.name, &config.telemetry)?;
    logging::init(&config.telemetry, provider.as_ref())?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        service = %config.service.name,
        bind_address = %config.listener.bind_address,
        otlp_endpoint = ?config.telemetry.otlp_endpoint,
        traces_enabled = provider.is_some(),
        "chaos-demo starting"
    );

    let metrics = MetricsSink::new()?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    let server = HttpServer::new(config, metrics);
    let result = server.run(listener, shutdown.subscribe()).await;

    if let Some(provider) = provider {
        otel::shutdown_tracer_provider(provider);
    }

    result?;
    tracing::info!("Shutdown complete");
    Ok(())
}
