//! Readiness gate in front of every gateway route.

// crates.io
use axum::{
	extract::{Request, State},
	middleware::Next,
	response::{IntoResponse, Response},
};
// self
use crate::server::{ApiError, AppState};

/// Rejects gated requests with 503 while no upstream token is held.
pub async fn require_ready(State(state): State<AppState>, req: Request, next: Next) -> Response {
	if !state.manager.is_ready() {
		tracing::warn!(path = %req.uri().path(), "Rejecting request; upstream token not acquired.");

		return ApiError::not_ready().into_response();
	}

	next.run(req).await
}
