//! Metrics collection and exposition.
//!
//! # Metrics
//! - `http_requests_total` (counter): requests by service, method, path, status
//! - `http_request_duration_seconds` (histogram): latency by service, method, path
//!
//! # Design Decisions
//! - The Prometheus recorder is built, not installed: `MetricsSink` owns it
//!   and every update runs under `metrics::with_local_recorder`, so each
//!   server (and each test) has its own registry
//! - Fixed histogram buckets tuned for web latencies up to 5s
//! - A built recorder does not drain its histogram buffers by itself;
//!   [`MetricsSink::spawn_upkeep`] does it every [`UPKEEP_INTERVAL`]

use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::{
    BuildError, Matcher, PrometheusBuilder, PrometheusHandle, PrometheusRecorder,
};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

pub const REQUESTS_TOTAL: &str = "http_requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";

/// Histogram bucket upper bounds in seconds.
pub const DURATION_BUCKETS: [f64; 11] =
    [0.01, 0.025, 0.05, 0.1, 0.2, 0.3, 0.5, 0.75, 1.0, 2.0, 5.0];

/// How often pending histogram observations are folded into the registry.
pub const UPKEEP_INTERVAL: Duration = Duration::from_secs(5);

/// Content type of the text exposition format.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

#[derive(Debug, thiserror::Error)]
#[error("failed to configure metrics recorder: {0}")]
pub struct MetricsError(#[from] BuildError);

/// In-memory metric registry shared by the pipeline and `/metrics`.
#[derive(Clone)]
pub struct MetricsSink {
    recorder: Arc<PrometheusRecorder>,
    handle: PrometheusHandle,
}

impl MetricsSink {
    pub fn new() -> Result<Self, MetricsError> {
        let recorder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Full(REQUEST_DURATION_SECONDS.to_string()),
                &DURATION_BUCKETS,
            )?
            .build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            describe_counter!(REQUESTS_TOTAL, "Total HTTP requests");
            describe_histogram!(
                REQUEST_DURATION_SECONDS,
                Unit::Seconds,
                "HTTP request latency"
            );
        });

        Ok(Self {
            recorder: Arc::new(recorder),
            handle,
        })
    }

    /// Record one finished request: one counter increment, one observation.
    pub fn record_request(
        &self,
        service: &str,
        method: &str,
        path: &str,
        status: &str,
        elapsed: Duration,
    ) {
        metrics::with_local_recorder(self.recorder.as_ref(), || {
            counter!(
                REQUESTS_TOTAL,
                "service" => service.to_string(),
                "method" => method.to_string(),
                "path" => path.to_string(),
                "status" => status.to_string()
            )
            .increment(1);
            histogram!(
                REQUEST_DURATION_SECONDS,
                "service" => service.to_string(),
                "method" => method.to_string(),
                "path" => path.to_string()
            )
            .record(elapsed.as_secs_f64());
        });
    }

    /// Render the registry in the text exposition format.
    pub fn render(&self) -> String {
        self.handle.render()
    }

    /// Drain buffered histogram observations into their summaries.
    pub fn run_upkeep(&self) {
        self.handle.run_upkeep();
    }

    /// Run [`Self::run_upkeep`] every `interval` until `shutdown` fires.
    pub fn spawn_upkeep(
        &self,
        interval: Duration,
        mut shutdown: broadcast::Receiver<()>,
    ) -> JoinHandle<()> {
        let sink = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => sink.run_upkeep(),
                    _ = shutdown.recv() => {
                        tracing::debug!("Metrics upkeep stopped");
                        break;
                    }
                }
            }
        })
    }
}

impl std::fmt::Debug for MetricsSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsSink").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(out: &str, name: &str, labels: &[&str]) -> Option<f64> {
        out.lines()
            .filter(|line| line.starts_with(&format!("{name}{{")))
            .find(|line| labels.iter().all(|l| line.contains(l)))
            .and_then(|line| line.rsplit(' ').next())
            .and_then(|v| v.parse().ok())
    }

    #[test]
    fn test_record_request_renders_counter_and_histogram() {
        let sink = MetricsSink::new().unwrap();
        sink.record_request("api", "GET", "/api/hello", "200", Duration::from_millis(30));
        sink.record_request("api", "GET", "/api/hello", "200", Duration::from_millis(30));
        sink.record_request("api", "GET", "/api/hello", "500", Duration::from_millis(3));

        let out = sink.render();
        assert!(out.contains("# HELP http_requests_total Total HTTP requests"));
        let ok = [r#"service="api""#, r#"method="GET""#, r#"path="/api/hello""#, r#"status="200""#];
        assert_eq!(sample(&out, REQUESTS_TOTAL, &ok), Some(2.0));
        let failed = [r#"path="/api/hello""#, r#"status="500""#];
        assert_eq!(sample(&out, REQUESTS_TOTAL, &failed), Some(1.0));
        assert_eq!(
            sample(&out, "http_request_duration_seconds_count", &[r#"path="/api/hello""#]),
            Some(3.0)
        );
        assert_eq!(
            sample(&out, "http_request_duration_seconds_bucket", &[r#"le="0.025""#]),
            Some(1.0)
        );
        assert_eq!(
            sample(&out, "http_request_duration_seconds_bucket", &[r#"le="+Inf""#]),
            Some(3.0)
        );
    }

    #[test]
    fn test_upkeep_keeps_histogram_totals() {
        let sink = MetricsSink::new().unwrap();
        for _ in 0..1000 {
            sink.record_request("api", "GET", "/api/db", "200", Duration::from_millis(40));
        }
        sink.run_upkeep();
        sink.record_request("api", "GET", "/api/db", "200", Duration::from_millis(40));
        sink.run_upkeep();

        let out = sink.render();
        assert_eq!(
            sample(&out, "http_request_duration_seconds_count", &[r#"path="/api/db""#]),
            Some(1001.0)
        );
        assert_eq!(
            sample(&out, "http_request_duration_seconds_bucket", &[r#"le="0.05""#]),
            Some(1001.0)
        );
    }

    #[tokio::test]
    async fn test_spawned_upkeep_stops_on_shutdown() {
        let sink = MetricsSink::new().unwrap();
        let (tx, rx) = broadcast::channel(1);
        let task = sink.spawn_upkeep(Duration::from_millis(5), rx);

        sink.record_request("api", "GET", "/healthz", "200", Duration::from_millis(1));
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(
            sample(&sink.render(), "http_request_duration_seconds_count", &[r#"path="/healthz""#]),
            Some(1.0)
        );

        tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("upkeep task did not stop")
            .unwrap();
    }

    #[test]
    fn test_sinks_are_isolated() {
        let a = MetricsSink::new().unwrap();
        let b = MetricsSink::new().unwrap();
        a.record_request("api", "GET", "/healthz", "200", Duration::from_millis(1));
        assert!(a.render().contains("/healthz"));
        assert!(!b.render().contains("/healthz"));
    }
}
