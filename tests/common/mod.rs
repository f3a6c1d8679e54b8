//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chaos_demo::config::AppConfig;
use chaos_demo::http::{build_router, AppState, HttpServer};
use chaos_demo::{MetricsSink, Shutdown};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower::ServiceExt;

/// Config with a near-instant simulated downstream and no trace export.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.telemetry.traces_enabled = false;
    config.downstream.min_delay_secs = 0.0;
    config.downstream.max_delay_secs = 0.002;
    config
}

pub fn test_state() -> AppState {
    AppState::new(&test_config(), MetricsSink::new().unwrap())
}

pub fn test_router(state: &AppState) -> Router {
    build_router(state.clone())
}

/// Send one request through the router in-process.
pub async fn send(router: &Router, method: Method, uri: &str) -> (StatusCode, Value) {
    send_body(router, method, uri, Body::empty()).await
}

pub async fn send_body(router: &Router, method: Method, uri: &str, body: Body) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

/// Value of the first sample of `name` whose labels contain every fragment.
pub fn sample(rendered: &str, name: &str, labels: &[&str]) -> Option<f64> {
    rendered
        .lines()
        .filter(|line| line.starts_with(&format!("{name}{{")))
        .find(|line| labels.iter().all(|l| line.contains(l)))
        .and_then(|line| line.rsplit(' ').next())
        .and_then(|v| v.parse().ok())
}

/// Sum of every sample of `name`.
pub fn sum_samples(rendered: &str, name: &str) -> f64 {
    rendered
        .lines()
        .filter(|line| line.starts_with(&format!("{name}{{")))
        .filter_map(|line| line.rsplit(' ').next())
        .filter_map(|v| v.parse::<f64>().ok())
        .sum()
}

/// Start a real server on an ephemeral port.
pub async fn spawn_server(
    config: AppConfig,
) -> (SocketAddr, AppState, Shutdown, JoinHandle<Result<(), std::io::Error>>) {
    let server = HttpServer::new(config, MetricsSink::new().unwrap());
    let state = server.state().clone();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let stop = shutdown.subscribe();
    let handle = tokio::spawn(async move { server.run(listener, stop).await });
    (addr, state, shutdown, handle)
}
