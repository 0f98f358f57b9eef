//! ControlPay routes. Failures are reported as 500 with the upstream body under `error`.

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
		controlpay::{self, CancelRequest, ListRequest},
	},
	obs,
	server::{ApiError, AppState, JsonBody},
};

type ControlPayResult = Result<Json<Value>, ApiError>;

/// `POST /api/payment-init`
pub async fn payment_init(
	State(state): State<AppState>,
	JsonBody(body): JsonBody<Map<String, Value>>,
) -> ControlPayResult {
	let sale = controlpay::prepare_sale(body).map_err(ApiError::controlpay)?;
	let result = state.controlpay.sell(&sale).await;

	respond(result)
}

/// `GET /payment-status/{id}`
pub async fn payment_status(
	State(state): State<AppState>,
	Path(intent_id): Path<String>,
) -> ControlPayResult {
	tracing::info!(%intent_id, "Querying sale intent.");

	respond(state.controlpay.intent_by_id(&intent_id).await)
}

/// `POST /payment-list`
pub async fn payment_list(
	State(state): State<AppState>,
	JsonBody(request): JsonBody<ListRequest>,
) -> ControlPayResult {
	let filter = request.into_filter(&state.defaults.terminal_id);
	let Json(body) = respond(state.controlpay.intents_by_filter(&filter).await)?;

	Ok(Json(controlpay::intent_list(body)))
}

/// `POST /payment-cancel`
pub async fn payment_cancel(
	State(state): State<AppState>,
	JsonBody(request): JsonBody<CancelRequest>,
) -> ControlPayResult {
	let command = request
		.into_command(&state.defaults.technical_password)
		.map_err(ApiError::controlpay)?;

	tracing::info!(intent_id = %command.transaction_id, "Cancelling sale.");

	respond(state.controlpay.cancel_sale(&command).await)
}

fn respond(result: Result<Value>) -> ControlPayResult {
	obs::record_upstream_result(Gateway::ControlPay, &result);

	result.map(Json).map_err(ApiError::controlpay)
}
