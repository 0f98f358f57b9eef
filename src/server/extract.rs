//! Request body extraction.

// crates.io
use axum::{
	body::Bytes,
	extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
// self
use crate::{_prelude::*, server::ApiError};

/// JSON body extractor that treats an empty body as `{}`.
///
/// Unlike `axum::Json` it does not require a JSON content type, and rejections use the
/// relay's `{error}` envelope.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);
impl<S, T> FromRequest<S> for JsonBody<T>
where
	S: Send + Sync,
	T: DeserializeOwned,
{
	type Rejection = ApiError;

	async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
		let bytes = Bytes::from_request(req, state)
			.await
			.map_err(|e| ApiError::validation(format!("Failed to read request body: {e}.")))?;

		parse(&bytes).map(JsonBody)
	}
}

fn parse<T>(bytes: &[u8]) -> Result<T, ApiError>
where
	T: DeserializeOwned,
{
	let parsed = if bytes.iter().all(u8::is_ascii_whitespace) {
		serde_json::from_value(Value::Object(Map::new()))
	} else {
		serde_json::from_slice(bytes)
	};

	parsed.map_err(|e| ApiError::validation(format!("Malformed JSON body: {e}.")))
}
