//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (chaos pipeline, request timeout, tracing, request ID)
//! - Bind server to listener and shut down gracefully

use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::chaos::{control, ChaosState};
use crate::config::{AppConfig, DownstreamConfig};
use crate::http::{
    handlers,
    pipeline::{chaos_pipeline, inject_latency},
};
use crate::observability::metrics::UPKEEP_INTERVAL;
use crate::observability::MetricsSink;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub service_name: Arc<str>,
    pub chaos: Arc<ChaosState>,
    pub metrics: MetricsSink,
    pub downstream: DownstreamConfig,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(config: &AppConfig, metrics: MetricsSink) -> Self {
        Self {
            service_name: Arc::from(config.service.name.as_str()),
            chaos: Arc::new(ChaosState::with_settings(
                config.chaos.latency_ms,
                config.chaos.error_rate,
            )),
            metrics,
            downstream: config.downstream.clone(),
            request_timeout: Duration::from_secs(config.timeouts.request_secs),
        }
    }
}

/// HTTP server for the demo API.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and registry.
    pub fn new(config: AppConfig, metrics: MetricsSink) -> Self {
        let state = AppState::new(&config, metrics);
        let router = Self::with_transport_layers(build_router(state.clone()));
        Self {
            router,
            config,
            state,
        }
    }

    /// Transport concerns outside the chaos pipeline: request ids and
    /// access spans.
    fn with_transport_layers(router: Router) -> Router {
        router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server until the shutdown receiver fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            service = %self.state.service_name,
            "HTTP server starting"
        );

        let upkeep = self
            .state
            .metrics
            .spawn_upkeep(UPKEEP_INTERVAL, shutdown.resubscribe());

        let served = axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await;
        upkeep.abort();
        served?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Shared state, e.g. to inspect chaos settings from tests.
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

/// Routes with the chaos pipeline applied to every one of them.
///
/// Layer order, outermost first: `chaos_pipeline` (span, panics, metrics),
/// the request timeout, `inject_latency`.
#[allow(deprecated)]
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/hello", get(handlers::hello))
        .route("/api/db", get(handlers::db_sim))
        .route("/api/chaos", get(control::get_settings).delete(control::reset))
        .route("/api/chaos/latency", post(control::set_latency))
        .route("/api/chaos/errors", post(control::set_error_rate))
        .route("/healthz", get(handlers::healthz))
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::from_fn_with_state(state.clone(), inject_latency))
        .layer(TimeoutLayer::new(state.request_timeout))
        .layer(middleware::from_fn_with_state(state.clone(), chaos_pipeline))
        .with_state(state)
}
