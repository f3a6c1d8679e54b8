//! Control endpoints that mutate [`ChaosState`](super::ChaosState).
//!
//! Parameters are read from the query string first and fall back to a JSON
//! body, so both `POST /api/chaos/latency?ms=200` and
//! `POST /api/chaos/latency` with `{"ms": 200}` work. Out-of-range values are
//! clamped; only missing or unparseable parameters are rejected.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::Uri,
    Json,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::chaos::ChaosSettings;
use crate::http::error::ApiError;
use crate::http::server::AppState;

#[derive(Debug, Deserialize)]
pub struct LatencyParams {
    pub ms: i64,
}

#[derive(Debug, Deserialize)]
pub struct ErrorRateParams {
    pub rate: f64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct LatencyResponse {
    pub latency_ms: u64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorRateResponse {
    pub error_rate: f64,
}

/// `POST /api/chaos/latency`
pub async fn set_latency(
    State(state): State<AppState>,
    uri: Uri,
    body: Bytes,
) -> Result<Json<LatencyResponse>, ApiError> {
    let params: LatencyParams = extract_params("ms", &uri, &body)?;
    let latency_ms = state.chaos.set_latency(params.ms);
    tracing::warn!(latency_ms, requested = params.ms, "CHAOS latency updated");
    Ok(Json(LatencyResponse { latency_ms }))
}

/// `POST /api/chaos/errors`
pub async fn set_error_rate(
    State(state): State<AppState>,
    uri: Uri,
    body: Bytes,
) -> Result<Json<ErrorRateResponse>, ApiError> {
    let params: ErrorRateParams = extract_params("rate", &uri, &body)?;
    let error_rate = state.chaos.set_error_rate(params.rate);
    tracing::warn!(error_rate = format_args!("{error_rate:.3}"), "CHAOS error rate updated");
    Ok(Json(ErrorRateResponse { error_rate }))
}

/// `GET /api/chaos`
pub async fn get_settings(State(state): State<AppState>) -> Json<ChaosSettings> {
    Json(state.chaos.get())
}

/// `DELETE /api/chaos`
pub async fn reset(State(state): State<AppState>) -> Json<ChaosSettings> {
    state.chaos.reset();
    tracing::warn!("CHAOS settings reset");
    Json(state.chaos.get())
}

fn extract_params<T: DeserializeOwned>(
    name: &'static str,
    uri: &Uri,
    body: &Bytes,
) -> Result<T, ApiError> {
    let in_query = uri
        .query()
        .is_some_and(|q| q.split('&').any(|pair| pair.split('=').next() == Some(name)));

    if in_query {
        return Query::<T>::try_from_uri(uri)
            .map(|Query(params)| params)
            .map_err(|e| ApiError::InvalidParameter {
                name,
                reason: e.body_text(),
            });
    }

    if body.is_empty() {
        return Err(ApiError::MissingParameter(name));
    }

    serde_json::from_slice(body).map_err(|e| ApiError::InvalidParameter {
        name,
        reason: e.to_string(),
    })
}
