//! Process-wide chaos settings.
//!
//! Readers call [`ChaosState::get`] on every request; writers are the control
//! endpoints. Both fields are published together through one `ArcSwap`, so a
//! reader can never observe half of a write, and updates go through `rcu` so
//! a concurrent latency write cannot undo an error-rate write (or vice versa).

use arc_swap::ArcSwap;
use serde::Serialize;

/// Snapshot of the chaos configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Default)]
pub struct ChaosSettings {
    /// Latency injected before every request, in milliseconds.
    pub latency_ms: u64,
    /// Probability in [0, 1] that a business handler fails.
    pub error_rate: f64,
}

/// Shared, concurrently mutable chaos configuration.
#[derive(Debug, Default)]
pub struct ChaosState {
    inner: ArcSwap<ChaosSettings>,
}

impl ChaosState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create state seeded with initial values (clamped like any other write).
    pub fn with_settings(latency_ms: i64, error_rate: f64) -> Self {
        let state = Self::new();
        state.set_latency(latency_ms);
        state.set_error_rate(error_rate);
        state
    }

    /// Current settings as one consistent snapshot.
    pub fn get(&self) -> ChaosSettings {
        **self.inner.load()
    }

    /// Replace the injected latency. Negative values become 0.
    pub fn set_latency(&self, ms: i64) -> u64 {
        let clamped = clamp_latency(ms);
        self.inner.rcu(|current| ChaosSettings {
            latency_ms: clamped,
            ..**current
        });
        clamped
    }

    /// Replace the injected error rate, clamped to [0, 1].
    pub fn set_error_rate(&self, rate: f64) -> f64 {
        let clamped = clamp_error_rate(rate);
        self.inner.rcu(|current| ChaosSettings {
            error_rate: clamped,
            ..**current
        });
        clamped
    }

    /// Restore defaults (no latency, no errors).
    pub fn reset(&self) {
        self.inner.store(std::sync::Arc::new(ChaosSettings::default()));
    }
}

pub fn clamp_latency(ms: i64) -> u64 {
    ms.max(0) as u64
}

/// NaN has no meaningful position in [0, 1] and is treated as 0.
pub fn clamp_error_rate(rate: f64) -> f64 {
    if rate.is_nan() {
        0.0
    } else {
        rate.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_defaults() {
        let state = ChaosState::new();
        assert_eq!(state.get(), ChaosSettings { latency_ms: 0, error_rate: 0.0 });
    }

    #[test]
    fn test_latency_clamped_to_zero() {
        let state = ChaosState::new();
        assert_eq!(state.set_latency(250), 250);
        assert_eq!(state.get().latency_ms, 250);
        assert_eq!(state.set_latency(-5), 0);
        assert_eq!(state.get().latency_ms, 0);
    }

    #[test]
    fn test_error_rate_clamped() {
        let state = ChaosState::new();
        assert_eq!(state.set_error_rate(1.7), 1.0);
        assert_eq!(state.set_error_rate(-0.2), 0.0);
        assert_eq!(state.set_error_rate(0.35), 0.35);
        assert_eq!(state.set_error_rate(f64::NAN), 0.0);
        assert_eq!(state.set_error_rate(f64::INFINITY), 1.0);
    }

    #[test]
    fn test_setters_do_not_clobber_each_other() {
        let state = ChaosState::new();
        state.set_latency(40);
        state.set_error_rate(0.5);
        assert_eq!(state.get(), ChaosSettings { latency_ms: 40, error_rate: 0.5 });

        state.reset();
        assert_eq!(state.get(), ChaosSettings::default());
    }

    #[test]
    fn test_with_settings_clamps() {
        let state = ChaosState::with_settings(-1, 3.0);
        assert_eq!(state.get(), ChaosSettings { latency_ms: 0, error_rate: 1.0 });
    }

    #[test]
    fn test_concurrent_writers_leave_a_submitted_value() {
        let state = Arc::new(ChaosState::new());
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let state = state.clone();
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        state.set_latency(i * 10);
                        state.set_error_rate(i as f64 / 20.0);
                        let snapshot = state.get();
                        assert!(snapshot.latency_ms % 10 == 0 && snapshot.latency_ms < 160);
                        assert!((0.0..=1.0).contains(&snapshot.error_rate));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let last = state.get();
        assert!((0..16).any(|i| last.latency_ms == i * 10));
        assert!((0..16).any(|i| last.error_rate == i as f64 / 20.0));
    }
}
