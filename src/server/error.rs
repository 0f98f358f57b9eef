//! Mapping of relay errors onto HTTP responses.
//!
//! Two policies coexist. Payer failures pass the upstream status and body through untouched,
//! while ControlPay failures are always reported as 500 with the upstream body (or the local
//! message) under `error`.

// crates.io
use axum::{
	Json,
	http::StatusCode,
	response::{IntoResponse, Response},
};
// self
use crate::{_prelude::*, error::TransportError};

const NO_RESPONSE: &str = "No response received from upstream.";

/// Error response produced by relay handlers.
#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	body: Value,
}
impl ApiError {
	/// 400 naming what is wrong with the request.
	pub fn validation(reason: impl Display) -> Self {
		Self::message(StatusCode::BAD_REQUEST, reason)
	}

	/// 503 reported while no upstream token is held.
	pub fn not_ready() -> Self {
		Self::message(StatusCode::SERVICE_UNAVAILABLE, Error::NotReady)
	}

	/// Relays an upstream status and body verbatim.
	pub fn passthrough(status: u16, body: Value) -> Self {
		let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);

		Self { status, body }
	}

	/// Maps a ControlPay failure: every upstream or transport failure becomes 500.
	pub fn controlpay(err: Error) -> Self {
		match err {
			Error::Validation { reason } => Self::validation(reason),
			Error::NotReady | Error::Login(_) => Self::not_ready(),
			Error::Upstream { status, body } => {
				tracing::error!(status, body = %body, "ControlPay rejected the request.");

				Self { status: StatusCode::INTERNAL_SERVER_ERROR, body: json!({ "error": body }) }
			},
			other => {
				tracing::error!(error = %other, "ControlPay call failed.");

				Self::message(StatusCode::INTERNAL_SERVER_ERROR, other)
			},
		}
	}

	/// HTTP status of the response.
	pub fn status(&self) -> StatusCode {
		self.status
	}

	fn message(status: StatusCode, message: impl Display) -> Self {
		Self { status, body: json!({ "error": message.to_string() }) }
	}
}
impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		match err {
			Error::Validation { reason } => Self::validation(reason),
			Error::NotReady | Error::Login(_) => Self::not_ready(),
			Error::Upstream { status, body } => {
				tracing::warn!(status, "Payer rejected the request; relaying its response.");

				Self::passthrough(status, body)
			},
			Error::Transport(e) => {
				match &e {
					TransportError::Timeout { .. } =>
						tracing::error!(error = %e, "Payer did not answer before the timeout."),
					TransportError::Network { .. } => tracing::error!(error = %e, "Payer unreachable."),
				}

				Self::message(StatusCode::INTERNAL_SERVER_ERROR, NO_RESPONSE)
			},
			other => {
				tracing::error!(error = %other, "Relay failure.");

				Self::message(StatusCode::INTERNAL_SERVER_ERROR, other)
			},
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		(self.status, Json(self.body)).into_response()
	}
}
