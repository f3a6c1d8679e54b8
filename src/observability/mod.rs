//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! http::pipeline / handlers produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!     → tracing.rs (spans exported over OTLP)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → GET /metrics (Prometheus scrape)
//!     → OTel collector (batched span export)
//! ```
//!
//! # Design Decisions
//! - Registry and tracer provider are built once in `main` and handed to the
//!   server, never looked up from globals by handlers
//! - Metrics are cheap (atomic increments)
//! - Trace export is optional; disabling it leaves logging untouched

pub mod logging;
pub mod metrics;
pub mod tracing;

pub use self::metrics::MetricsSink;
