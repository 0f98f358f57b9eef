//! Payer routes, all executed through the token manager's authorized wrapper.

// crates.io
use axum::{
	Json,
	extract::{Path, State},
};
// self
use crate::{
	_prelude::*,
	gateway::{
		Gateway,
		payer::{AbortRequest, StatusQuery},
	},
	obs,
	server::{ApiError, AppState, JsonBody},
};

type PayerResult = Result<Json<Value>, ApiError>;

const ABORT_NOTE: &str = "Abort acknowledged by the gateway only; the final payment outcome is \
	delivered asynchronously to the callback URL.";

/// `POST /relay-payment`
pub async fn relay_payment(
	State(state): State<AppState>,
	JsonBody(payment): JsonBody<Value>,
) -> PayerResult {
	let payer = &state.payer;
	let result = state
		.manager
		.authorized(|token| async move { payer.start_payment(&token, &payment).await })
		.await;

	respond(result)
}

/// `GET /relay-status/{correlationId}/{automationName}`
pub async fn relay_status(
	State(state): State<AppState>,
	Path((correlation_id, automation_name)): Path<(String, String)>,
) -> PayerResult {
	let payer = &state.payer;
	let query = StatusQuery { correlation_id, automation_name };
	let result =
		state.manager.authorized(|token| async move { payer.status(&token, &query).await }).await;

	respond(result)
}

/// `POST /relay-abort`
pub async fn relay_abort(
	State(state): State<AppState>,
	JsonBody(request): JsonBody<AbortRequest>,
) -> PayerResult {
	let command = request.into_command(&state.defaults.callback_url()?)?;
	let payer = &state.payer;
	let result =
		state.manager.authorized(|token| async move { payer.abort(&token, &command).await }).await;
	let Json(upstream) = respond(result)?;

	Ok(Json(json!({ "acknowledged": true, "note": ABORT_NOTE, "upstream": upstream })))
}

fn respond(result: Result<Value>) -> PayerResult {
	obs::record_upstream_result(Gateway::Payer, &result);

	Ok(Json(result?))
}
