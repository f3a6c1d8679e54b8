//! Demo business endpoints plus health and scrape endpoints.

use std::time::Duration;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::Instrument;

use crate::chaos;
use crate::config::DownstreamConfig;
use crate::http::server::AppState;
use crate::observability::metrics::CONTENT_TYPE;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct HelloResponse {
    pub service: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct DbResponse {
    pub ok: bool,
    pub sleep: f64,
}

/// `GET /api/hello`
pub async fn hello(State(state): State<AppState>) -> Response {
    let _span = tracing::info_span!("hello-handler").entered();

    if chaos::should_inject_error(state.chaos.get().error_rate) {
        tracing::error!("Chaos error triggered on /api/hello");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "chaos" })),
        )
            .into_response();
    }

    tracing::info!("Hello called");
    Json(HelloResponse {
        service: state.service_name.to_string(),
        message: "hello".to_string(),
    })
    .into_response()
}

/// `GET /api/db`: a downstream call with random latency that may fail.
pub async fn db_sim(State(state): State<AppState>) -> Response {
    let span = tracing::info_span!("db-sim", sleep_secs = tracing::field::Empty);

    async move {
        let sleep = sample_delay(&state.downstream);
        tracing::Span::current().record("sleep_secs", sleep);
        tokio::time::sleep(Duration::from_secs_f64(sleep)).await;

        if chaos::should_inject_error(state.chaos.get().error_rate) {
            tracing::error!("Chaos error triggered on /api/db");
            return (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": "db-downstream" })),
            )
                .into_response();
        }

        tracing::info!("db_sim ok (sleep={sleep:.3})");
        Json(DbResponse { ok: true, sleep }).into_response()
    }
    .instrument(span)
    .await
}

/// Uniform sample in `[min_delay_secs, max_delay_secs]`.
pub fn sample_delay(config: &DownstreamConfig) -> f64 {
    if config.max_delay_secs <= config.min_delay_secs {
        return config.min_delay_secs;
    }
    rand::thread_rng().gen_range(config.min_delay_secs..=config.max_delay_secs)
}

/// `GET /healthz`
pub async fn healthz() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// `GET /metrics`
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, CONTENT_TYPE)], state.metrics.render())
}
