//! Relay-level error types shared across the token manager, gateways, and server.

// self
use crate::_prelude::*;

/// Relay-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical relay error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Token cache failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// No response was received from an upstream gateway.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Login exchange failed; never surfaced to HTTP callers directly.
	#[error(transparent)]
	Login(#[from] LoginError),
	/// Listener could not be bound or the server loop failed.
	#[error("Server I/O failure.")]
	Io(#[from] std::io::Error),

	/// A required request field is missing or malformed.
	#[error("{reason}")]
	Validation {
		/// Caller-facing description of the missing field.
		reason: String,
	},
	/// Upstream gateway answered with a non-success status.
	#[error("Upstream gateway rejected the request with status {status}.")]
	Upstream {
		/// HTTP status returned by the gateway.
		status: u16,
		/// Response body returned by the gateway, verbatim.
		body: Value,
	},
	/// No usable bearer token is held right now.
	#[error("Service not ready: upstream token has not been acquired.")]
	NotReady,
}
impl Error {
	/// Builds a validation error for a missing request field.
	pub fn missing_field(field: &str) -> Self {
		Self::Validation { reason: format!("Missing required field `{field}`.") }
	}

	/// Returns `true` when the upstream rejected the call as unauthenticated.
	pub fn is_unauthorized(&self) -> bool {
		matches!(self, Self::Upstream { status: 401, .. })
	}
}

/// Configuration and validation failures raised while assembling the relay.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Required environment variable is not set.
	#[error("Environment variable `{name}` is required.")]
	MissingVar {
		/// Variable name.
		name: &'static str,
	},
	/// Environment variable holds a value that cannot be parsed.
	#[error("Environment variable `{name}` has an invalid value: {reason}.")]
	InvalidVar {
		/// Variable name.
		name: &'static str,
		/// Parser-supplied reason.
		reason: String,
	},
	/// Configured URL cannot be parsed.
	#[error("Environment variable `{name}` is not a valid URL.")]
	InvalidUrl {
		/// Variable name.
		name: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Upstream endpoint path cannot be joined onto the configured base URL.
	#[error("Endpoint `{path}` cannot be joined onto the gateway base URL.")]
	InvalidEndpoint {
		/// Relative endpoint path.
		path: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Login exchange failures. They only ever close the readiness gate.
#[derive(Debug, ThisError)]
pub enum LoginError {
	/// Login endpoint answered with a non-success status.
	#[error("Login endpoint rejected the credentials with status {status}.")]
	Rejected {
		/// HTTP status code.
		status: u16,
	},
	/// Login response did not carry a token.
	#[error("Login response is missing the token field.")]
	MissingToken,
	/// Login endpoint responded with malformed JSON that could not be parsed.
	#[error("Login endpoint returned malformed JSON.")]
	MalformedResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}

/// Transport-level failures (network, timeout, IO) where no upstream response was received.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("No response received from upstream.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Upstream did not answer within the configured timeout.
	#[error("Upstream did not respond before the timeout elapsed.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::Timeout { source: Box::new(e) } } else { Self::network(e) }
	}
}
