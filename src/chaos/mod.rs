//! Chaos injection subsystem.
//!
//! # Data Flow
//! ```text
//! POST /api/chaos/{latency,errors}
//!     → control.rs (parse, clamp, log)
//!     → state.rs (atomic swap of ChaosSettings)
//!
//! Every request:
//!     http::pipeline reads latency_ms → sleeps
//!     http::handlers read error_rate → should_inject_error()
//! ```
//!
//! # Design Decisions
//! - Settings live behind a single `ArcSwap`, so a reader always sees both
//!   fields from the same write
//! - Out-of-range input is clamped, never rejected
//! - Settings are process-local and lost on restart

pub mod control;
pub mod state;

pub use state::{ChaosSettings, ChaosState};

/// Returns true when an error should be injected for a sample drawn from [0, 1).
pub fn error_triggered(error_rate: f64, sample: f64) -> bool {
    error_rate > 0.0 && sample < error_rate
}

/// Draw a fresh uniform sample and decide whether to inject an error.
pub fn should_inject_error(error_rate: f64) -> bool {
    let sample: f64 = rand::random();
    error_triggered(error_rate, sample)
}
