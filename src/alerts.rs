//! Alert webhook receiver.
//!
//! Accepts any JSON document on `POST /`, logs it with a UTC timestamp and
//! acknowledges it. Nothing is stored.

use axum::{routing::post, Json, Router};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

pub fn router() -> Router {
    Router::new().route("/", post(receive_alert))
}

async fn receive_alert(Json(payload): Json<Value>) -> Json<Value> {
    let received_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
    let pretty = serde_json::to_string_pretty(&payload).unwrap_or_else(|_| payload.to_string());
    tracing::info!(%received_at, "ALERTMANAGER WEBHOOK:\n{pretty}");
    Json(json!({ "ok": true }))
}
