//! Chaos-aware request pipeline.
//!
//! Every request passes through [`chaos_pipeline`], then the request
//! timeout, then [`inject_latency`]:
//!
//! ```text
//! start timer, open `http_request` span
//!     → timeout (408 once `timeouts.request_secs` elapse)
//!         → sleep latency_ms (read once from ChaosState)
//!         → handler
//!     → panics caught, status recorded on the span
//!     → RequestOutcome dropped: counter + histogram recorded exactly once
//! ```
//!
//! # Design Decisions
//! - The timeout sits inside the recording step and covers the injected
//!   latency, so a timed-out request is recorded with the 408 the client sees
//! - Recording lives in `Drop`; a request future dropped before a response
//!   exists (client gone) is recorded with status 499
//! - No lock is held across the latency sleep; a concurrent control write
//!   only affects later requests

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use futures_util::FutureExt;
use tracing::{field, Instrument};

use crate::http::error::internal_error_response;
use crate::http::server::AppState;
use crate::observability::MetricsSink;

/// Status label for requests that never produced a response.
pub const ABANDONED_STATUS: &str = "499";

/// Per-request record consumed by the metrics sink when dropped.
pub struct RequestOutcome {
    metrics: MetricsSink,
    service: String,
    method: String,
    path: String,
    start: Instant,
    status: String,
}

impl RequestOutcome {
    pub fn start(metrics: MetricsSink, service: &str, method: &str, path: &str) -> Self {
        Self {
            metrics,
            service: service.to_string(),
            method: method.to_string(),
            path: path.to_string(),
            start: Instant::now(),
            status: ABANDONED_STATUS.to_string(),
        }
    }

    pub fn set_status(&mut self, status: u16) {
        self.status = status.to_string();
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for RequestOutcome {
    fn drop(&mut self) {
        self.metrics.record_request(
            &self.service,
            &self.method,
            &self.path,
            &self.status,
            self.start.elapsed(),
        );
    }
}

/// Middleware applied to every route.
pub async fn chaos_pipeline(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let mut outcome = RequestOutcome::start(state.metrics.clone(), &state.service_name, &method, &path);

    let span = tracing::info_span!(
        "http_request",
        otel.name = %format!("{method} {path}"),
        otel.kind = "server",
        http.request.method = %method,
        url.path = %path,
        http.response.status_code = field::Empty,
    );

    let result = AssertUnwindSafe(next.run(request))
        .catch_unwind()
        .instrument(span.clone())
        .await;

    let response = match result {
        Ok(response) => response,
        Err(panic) => {
            tracing::error!(
                parent: &span,
                method = %method,
                path = %path,
                error = %panic_message(panic.as_ref()),
                "Unhandled error in request handler"
            );
            internal_error_response()
        }
    };

    let status = response.status().as_u16();
    span.record("http.response.status_code", status);
    outcome.set_status(status);

    tracing::debug!(
        method = %method,
        path = %path,
        status,
        duration_ms = outcome.elapsed().as_millis() as u64,
        "Request completed"
    );

    response
}

/// Sleep for the configured chaos latency before the handler runs.
pub async fn inject_latency(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let latency_ms = state.chaos.get().latency_ms;
    if latency_ms > 0 {
        tracing::debug!(latency_ms, "Injecting latency");
        tokio::time::sleep(Duration::from_millis(latency_ms)).await;
    }
    next.run(request).await
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
