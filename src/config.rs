//! Environment-driven relay configuration.
//!
//! Variables are read through [`ReadEnv`] so tests can feed a plain map instead of mutating
//! the process environment. Every value is validated up front; the binary refuses to start
//! on the first [`ConfigError`].

// std
use std::{
	env::{self, VarError},
	net::{IpAddr, Ipv4Addr, SocketAddr},
	path::PathBuf,
	time::Duration,
};
// crates.io
use axum::http::HeaderValue;
// self
use crate::{
	_prelude::*,
	auth::Credential,
	error::ConfigError,
	gateway::controlpay,
	http::DEFAULT_TIMEOUT,
	manager::DEFAULT_REFRESH_INTERVAL,
};

/// Terminal used when a listing request names none.
pub const DEFAULT_TERMINAL_ID: &str = "4517";
/// Technical password used when a cancellation request carries none.
pub const DEFAULT_TECHNICAL_PASSWORD: &str = "111111";
/// Origin allowed by CORS when none is configured.
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";
/// Listen port used when none is configured.
pub const DEFAULT_PORT: u16 = 3001;

/// Source of environment variables.
pub trait ReadEnv {
	/// Returns the value of `key`.
	fn var(&self, key: &str) -> Result<String, VarError>;
}

/// Reads the real process environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemEnv;
impl ReadEnv for SystemEnv {
	fn var(&self, key: &str) -> Result<String, VarError> {
		env::var(key)
	}
}

impl ReadEnv for HashMap<String, String> {
	fn var(&self, key: &str) -> Result<String, VarError> {
		self.get(key).cloned().ok_or(VarError::NotPresent)
	}
}

/// ControlPay connection settings.
#[derive(Clone, Debug)]
pub struct ControlPayConfig {
	/// API base, always ending with `/`.
	pub base_url: Url,
	/// API key appended to every request.
	pub api_key: String,
}

/// Payer connection settings.
#[derive(Clone, Debug)]
pub struct PayerConfig {
	/// API base, always ending with `/`.
	pub base_url: Url,
	/// Login credential.
	pub credential: Credential,
}

/// Fully validated relay configuration.
#[derive(Clone, Debug)]
pub struct RelayConfig {
	/// Address the HTTP server binds to.
	pub listen: SocketAddr,
	/// Single origin allowed by CORS.
	pub allowed_origin: HeaderValue,
	/// Per-call upstream timeout.
	pub upstream_timeout: Duration,
	/// Interval between scheduled token refreshes.
	pub refresh_interval: Duration,
	/// ControlPay settings.
	pub controlpay: ControlPayConfig,
	/// Payer settings.
	pub payer: PayerConfig,
	/// Public base URL of this relay, used to build the abort callback.
	pub public_url: Url,
	/// Optional file mirror of the token slot.
	pub token_cache_path: Option<PathBuf>,
	/// Terminal used when a listing request names none.
	pub default_terminal_id: String,
	/// Technical password used when a cancellation request carries none.
	pub default_technical_password: String,
}
impl RelayConfig {
	/// Reads and validates every setting from `env`.
	pub fn from_env<E: ReadEnv>(env: &E) -> Result<Self, ConfigError> {
		let host = match optional(env, "HOST") {
			Some(raw) => raw
				.parse::<IpAddr>()
				.map_err(|e| ConfigError::InvalidVar { name: "HOST", reason: e.to_string() })?,
			None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
		};
		let port = match optional(env, "PORT") {
			Some(raw) => raw
				.parse::<u16>()
				.map_err(|e| ConfigError::InvalidVar { name: "PORT", reason: e.to_string() })?,
			None => DEFAULT_PORT,
		};
		let allowed_origin = optional(env, "ALLOWED_ORIGIN")
			.unwrap_or_else(|| DEFAULT_ALLOWED_ORIGIN.to_owned());
		let allowed_origin = HeaderValue::from_str(&allowed_origin).map_err(|e| {
			ConfigError::InvalidVar { name: "ALLOWED_ORIGIN", reason: e.to_string() }
		})?;
		let api_key = optional(env, "CONTROLPAY_KEY")
			.or_else(|| optional(env, "PAYGO_TOKEN"))
			.ok_or(ConfigError::MissingVar { name: "CONTROLPAY_KEY" })?;
		let controlpay_base = optional(env, "CONTROLPAY_BASE_URL")
			.unwrap_or_else(|| controlpay::DEFAULT_BASE_URL.to_owned());
		let credential = Credential::new(
			required(env, "PAYER_CLIENT_ID")?,
			required(env, "PAYER_USERNAME")?,
			required(env, "PAYER_PASSWORD")?,
		);
		let public_url = optional(env, "PUBLIC_BASE_URL")
			.unwrap_or_else(|| format!("http://localhost:{port}/"));

		Ok(Self {
			listen: SocketAddr::new(host, port),
			allowed_origin,
			upstream_timeout: seconds(env, "UPSTREAM_TIMEOUT_SECS", DEFAULT_TIMEOUT)?,
			refresh_interval: seconds(env, "TOKEN_REFRESH_INTERVAL_SECS", DEFAULT_REFRESH_INTERVAL)?,
			controlpay: ControlPayConfig {
				base_url: base_url("CONTROLPAY_BASE_URL", &controlpay_base)?,
				api_key,
			},
			payer: PayerConfig {
				base_url: base_url("PAYER_BASE_URL", &required(env, "PAYER_BASE_URL")?)?,
				credential,
			},
			public_url: base_url("PUBLIC_BASE_URL", &public_url)?,
			token_cache_path: optional(env, "TOKEN_CACHE_PATH").map(PathBuf::from),
			default_terminal_id: optional(env, "DEFAULT_TERMINAL_ID")
				.unwrap_or_else(|| DEFAULT_TERMINAL_ID.to_owned()),
			default_technical_password: optional(env, "DEFAULT_TECHNICAL_PASSWORD")
				.unwrap_or_else(|| DEFAULT_TECHNICAL_PASSWORD.to_owned()),
		})
	}
}

fn optional<E: ReadEnv>(env: &E, name: &str) -> Option<String> {
	env.var(name).ok().map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

fn required<E: ReadEnv>(env: &E, name: &'static str) -> Result<String, ConfigError> {
	optional(env, name).ok_or(ConfigError::MissingVar { name })
}

fn seconds<E: ReadEnv>(
	env: &E,
	name: &'static str,
	default: Duration,
) -> Result<Duration, ConfigError> {
	let Some(raw) = optional(env, name) else {
		return Ok(default);
	};
	let secs = raw
		.parse::<u64>()
		.map_err(|e| ConfigError::InvalidVar { name, reason: e.to_string() })?;

	if secs == 0 {
		return Err(ConfigError::InvalidVar { name, reason: "must be greater than zero".into() });
	}

	Ok(Duration::from_secs(secs))
}

/// Parses a base URL and guarantees the trailing slash relative joins depend on.
fn base_url(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
	let mut url = Url::parse(raw).map_err(|source| ConfigError::InvalidUrl { name, source })?;

	if !url.path().ends_with('/') {
		let path = format!("{}/", url.path());

		url.set_path(&path);
	}

	Ok(url)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
		let mut map: HashMap<String, String> = [
			("CONTROLPAY_KEY", "cp-key"),
			("PAYER_BASE_URL", "https://payer.example.com/api"),
			("PAYER_CLIENT_ID", "client"),
			("PAYER_USERNAME", "operator"),
			("PAYER_PASSWORD", "hunter2"),
		]
		.into_iter()
		.map(|(k, v)| (k.to_owned(), v.to_owned()))
		.collect();

		for (k, v) in pairs {
			map.insert((*k).to_owned(), (*v).to_owned());
		}

		map
	}

	#[test]
	fn defaults_apply_when_optional_vars_are_unset() {
		let config = RelayConfig::from_env(&env(&[])).expect("Minimal env must validate.");

		assert_eq!(config.listen, "0.0.0.0:3001".parse::<SocketAddr>().expect("Address must parse."));
		assert_eq!(config.allowed_origin, DEFAULT_ALLOWED_ORIGIN);
		assert_eq!(config.upstream_timeout, Duration::from_secs(30));
		assert_eq!(config.refresh_interval, Duration::from_secs(3300));
		assert_eq!(config.controlpay.base_url.as_str(), controlpay::DEFAULT_BASE_URL);
		assert_eq!(config.payer.base_url.as_str(), "https://payer.example.com/api/");
		assert_eq!(config.public_url.as_str(), "http://localhost:3001/");
		assert_eq!(config.default_terminal_id, "4517");
		assert_eq!(config.default_technical_password, "111111");
		assert!(config.token_cache_path.is_none());
	}

	#[test]
	fn legacy_key_name_is_accepted() {
		let mut map = env(&[("PAYGO_TOKEN", "legacy")]);

		map.remove("CONTROLPAY_KEY");

		let config = RelayConfig::from_env(&map).expect("Legacy key must validate.");

		assert_eq!(config.controlpay.api_key, "legacy");
	}

	#[test]
	fn missing_credential_is_reported_by_name() {
		let mut map = env(&[]);

		map.remove("PAYER_PASSWORD");

		let err = RelayConfig::from_env(&map).expect_err("Missing password must fail.");

		assert!(matches!(err, ConfigError::MissingVar { name: "PAYER_PASSWORD" }));
	}

	#[test]
	fn zero_and_garbage_durations_are_rejected() {
		let err = RelayConfig::from_env(&env(&[("TOKEN_REFRESH_INTERVAL_SECS", "0")]))
			.expect_err("Zero interval must fail.");

		assert!(matches!(err, ConfigError::InvalidVar { name: "TOKEN_REFRESH_INTERVAL_SECS", .. }));

		let err = RelayConfig::from_env(&env(&[("UPSTREAM_TIMEOUT_SECS", "soon")]))
			.expect_err("Non-numeric timeout must fail.");

		assert!(matches!(err, ConfigError::InvalidVar { name: "UPSTREAM_TIMEOUT_SECS", .. }));
	}

	#[test]
	fn invalid_url_is_rejected() {
		let err = RelayConfig::from_env(&env(&[("PAYER_BASE_URL", "not a url")]))
			.expect_err("Invalid URL must fail.");

		assert!(matches!(err, ConfigError::InvalidUrl { name: "PAYER_BASE_URL", .. }));
	}
}
