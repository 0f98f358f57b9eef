//! Transport primitives shared by both gateway clients.
//!
//! [`ReqwestHttpClient`] owns the configured [`ReqwestClient`] (timeout + user agent) and
//! turns every exchange into an [`UpstreamResponse`] whose body is kept as raw JSON so
//! handlers can relay it verbatim. Requests that never produce a response surface as
//! [`TransportError`].

// std
use std::{ops::Deref, time::Duration};
// crates.io
use reqwest::RequestBuilder;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
};

/// User agent announced to both gateways.
pub const USER_AGENT: &str = "DragonTotem/1.0";
/// Per-call timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient(pub ReqwestClient);
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client that bounds every call by `timeout`.
	pub fn with_timeout(timeout: Duration) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().timeout(timeout).user_agent(USER_AGENT).build()?;

		Ok(Self(client))
	}

	/// Sends `request` and captures status + body.
	///
	/// Any upstream status is returned as `Ok`; only a missing response is an error.
	pub async fn send(&self, request: RequestBuilder) -> Result<UpstreamResponse> {
		let response = request.send().await.map_err(TransportError::from)?;
		let status = response.status().as_u16();
		let bytes = response.bytes().await.map_err(TransportError::from)?;

		Ok(UpstreamResponse { status, body: parse_body(&bytes) })
	}
}
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

/// Status and body captured from a gateway.
#[derive(Clone, Debug, PartialEq)]
pub struct UpstreamResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response body; JSON when parseable, otherwise the raw text.
	pub body: Value,
}
impl UpstreamResponse {
	/// Whether the gateway answered with a 2xx status.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Returns the body on success or [`Error::Upstream`] carrying status and body.
	pub fn into_result(self) -> Result<Value> {
		if self.is_success() {
			Ok(self.body)
		} else {
			Err(Error::Upstream { status: self.status, body: self.body })
		}
	}
}

fn parse_body(bytes: &[u8]) -> Value {
	if bytes.iter().all(u8::is_ascii_whitespace) {
		return Value::Null;
	}

	serde_json::from_slice(bytes)
		.unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}
