//! Liveness and readiness probes.

// crates.io
use axum::{Json, extract::State, http::StatusCode};
// self
use crate::{_prelude::*, server::AppState};

/// Liveness probe.
pub async fn health() -> Json<Value> {
	Json(json!({ "ok": true }))
}

/// Readiness probe: 200 while a token is held, 503 otherwise.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
	let ready = state.manager.is_ready();
	let status = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };

	(status, Json(json!({ "ready": ready, "refresh": state.manager.refresh_metrics.snapshot() })))
}
