//! Payer client: login exchange plus the bearer-authenticated payment operations.

// crates.io
use reqwest::RequestBuilder;
// self
use crate::{
	_prelude::*,
	auth::{Credential, Token},
	error::LoginError,
	gateway,
	http::ReqwestHttpClient,
};

const LOGIN_PATH: &str = "auth/login";
const PAYMENTS_PATH: &str = "payments";
const STATUS_PATH: &str = "payments/status";
const COMMAND_PATH: &str = "payments/command";

/// Command name sent to abort a running payment automation.
pub const ABORT_COMMAND: &str = "ABORT";

/// Login endpoint response; only the token field matters.
#[derive(Debug, Deserialize)]
struct LoginResponse {
	#[serde(default, alias = "accessToken", alias = "access_token")]
	token: Option<String>,
}

/// Identifies one payment automation on the Payer side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusQuery {
	/// Correlation id issued when the payment started.
	pub correlation_id: String,
	/// Automation that runs the payment.
	pub automation_name: String,
}

/// Incoming abort request before validation.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbortRequest {
	/// Correlation id of the payment to abort.
	#[serde(default)]
	pub correlation_id: Option<Value>,
	/// Automation that runs the payment.
	#[serde(default)]
	pub automation_name: Option<Value>,
	/// Receiver device or terminal.
	#[serde(default)]
	pub receiver: Option<Value>,
}
impl AbortRequest {
	/// Validates the three identifying fields and builds the abort envelope.
	pub fn into_command(self, callback_url: &Url) -> Result<AbortCommand> {
		Ok(AbortCommand {
			correlation_id: gateway::require(self.correlation_id, "correlationId")?,
			automation_name: gateway::require(self.automation_name, "automationName")?,
			receiver: gateway::require(self.receiver, "receiver")?,
			command: ABORT_COMMAND.into(),
			callback_url: callback_url.to_string(),
		})
	}
}

/// Abort envelope forwarded to the Payer command endpoint.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AbortCommand {
	/// Correlation id of the payment to abort.
	pub correlation_id: Value,
	/// Automation that runs the payment.
	pub automation_name: Value,
	/// Receiver device or terminal.
	pub receiver: Value,
	/// Always [`ABORT_COMMAND`].
	pub command: String,
	/// Where Payer reports the outcome of the command.
	pub callback_url: String,
}

/// Bearer-authenticated Payer client.
#[derive(Clone, Debug)]
pub struct PayerClient {
	http_client: ReqwestHttpClient,
	base_url: Url,
}
impl PayerClient {
	/// Creates a client rooted at `base_url` (must end with `/`).
	pub fn new(http_client: ReqwestHttpClient, base_url: Url) -> Self {
		Self { http_client, base_url }
	}

	/// Exchanges the credential for a bearer token.
	pub async fn login(&self, credential: &Credential) -> Result<Token> {
		let url = gateway::endpoint(&self.base_url, LOGIN_PATH)?;
		let response = self
			.http_client
			.send(self.http_client.post(url).json(&credential.login_body()))
			.await?;

		if !response.is_success() {
			return Err(LoginError::Rejected { status: response.status }.into());
		}

		let parsed: LoginResponse = serde_path_to_error::deserialize(response.body)
			.map_err(|source| LoginError::MalformedResponse { source })?;

		match parsed.token {
			Some(token) if !token.trim().is_empty() => Ok(Token::new(token)),
			_ => Err(LoginError::MissingToken.into()),
		}
	}

	/// Starts a payment, forwarding `payment` verbatim.
	pub async fn start_payment(&self, token: &Token, payment: &Value) -> Result<Value> {
		let url = gateway::endpoint(&self.base_url, PAYMENTS_PATH)?;

		self.send_authorized(token, self.http_client.post(url).json(payment)).await
	}

	/// Queries the status of a running payment.
	pub async fn status(&self, token: &Token, query: &StatusQuery) -> Result<Value> {
		let mut url = gateway::endpoint(&self.base_url, STATUS_PATH)?;

		url.query_pairs_mut()
			.append_pair("correlationId", &query.correlation_id)
			.append_pair("automationName", &query.automation_name);

		self.send_authorized(token, self.http_client.get(url)).await
	}

	/// Sends the abort command.
	pub async fn abort(&self, token: &Token, command: &AbortCommand) -> Result<Value> {
		let url = gateway::endpoint(&self.base_url, COMMAND_PATH)?;

		tracing::info!(correlation_id = %command.correlation_id, "Sending abort command to Payer.");

		self.send_authorized(token, self.http_client.post(url).json(command)).await
	}

	async fn send_authorized(&self, token: &Token, request: RequestBuilder) -> Result<Value> {
		self.http_client.send(request.bearer_auth(token.expose())).await?.into_result()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn login_response_accepts_token_aliases() {
		for body in [
			json!({ "token": "a" }),
			json!({ "accessToken": "a" }),
			json!({ "access_token": "a", "expiresIn": 3600 }),
		] {
			let parsed: LoginResponse =
				serde_json::from_value(body).expect("Login response must deserialize.");

			assert_eq!(parsed.token.as_deref(), Some("a"));
		}
	}

	#[test]
	fn abort_requires_all_identifiers() {
		let callback = Url::parse("http://relay.test/relay-webhook").expect("URL must parse.");
		let err = AbortRequest {
			correlation_id: Some(json!("c-1")),
			automation_name: Some(json!("totem")),
			receiver: None,
		}
		.into_command(&callback)
		.expect_err("Missing receiver must fail.");

		assert_eq!(err.to_string(), "Missing required field `receiver`.");
	}

	#[test]
	fn abort_envelope_carries_command_and_callback() {
		let callback = Url::parse("http://relay.test/relay-webhook").expect("URL must parse.");
		let request: AbortRequest = serde_json::from_value(json!({
			"correlationId": "c-1",
			"automationName": "totem",
			"receiver": "pinpad-3",
		}))
		.expect("Abort request must deserialize.");
		let command = request.into_command(&callback).expect("Abort must validate.");

		assert_eq!(
			serde_json::to_value(&command).expect("Command must serialize."),
			json!({
				"correlationId": "c-1",
				"automationName": "totem",
				"receiver": "pinpad-3",
				"command": "ABORT",
				"callbackUrl": "http://relay.test/relay-webhook",
			}),
		);
	}
}
