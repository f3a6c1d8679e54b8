//! Synthetic load generator.
//!
//! Issues GET requests against a random demo endpoint at a fixed interval
//! until shutdown. Request failures are expected while chaos is active and
//! are dropped.

use std::time::Duration;

use tokio::sync::broadcast;

pub const PATHS: [&str; 2] = ["/api/hello", "/api/db"];

#[derive(Debug, Clone)]
pub struct LoadGenConfig {
    /// Base URL of the target API, e.g. `http://api:8080`.
    pub target: String,
    /// Pause between two requests.
    pub interval: Duration,
    /// Per-request timeout.
    pub timeout: Duration,
}

pub fn pick_path() -> &'static str {
    PATHS[fastrand::usize(..PATHS.len())]
}

/// Run until `shutdown` fires; returns the number of requests issued.
pub async fn run(
    config: LoadGenConfig,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<u64, reqwest::Error> {
    let client = reqwest::Client::builder()
        .timeout(config.timeout)
        .no_proxy()
        .build()?;
    let base = config.target.trim_end_matches('/').to_string();
    let mut issued = 0_u64;

    tracing::info!(base_url = %base, interval = ?config.interval, "Load generator started");

    loop {
        let url = format!("{base}{}", pick_path());
        issued += 1;

        tokio::select! {
            result = client.get(&url).send() => match result {
                Ok(response) => tracing::debug!(%url, status = %response.status(), "Request sent"),
                Err(e) => tracing::debug!(%url, error = %e, "Request failed"),
            },
            _ = shutdown.recv() => break,
        }

        tokio::select! {
            _ = tokio::time::sleep(config.interval) => {}
            _ = shutdown.recv() => break,
        }
    }

    tracing::info!(issued, "Load generator stopped");
    Ok(issued)
}
