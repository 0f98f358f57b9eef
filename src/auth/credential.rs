//! Login credential triple sourced from configuration.

// self
use crate::{_prelude::*, auth::Secret};

/// Immutable login credential used for every token exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credential {
	/// Client identifier registered with the gateway.
	pub client_id: String,
	/// Login user name.
	pub username: String,
	/// Login password; redacted in logs.
	pub password: Secret,
}
impl Credential {
	/// Builds a credential triple.
	pub fn new(
		client_id: impl Into<String>,
		username: impl Into<String>,
		password: impl Into<String>,
	) -> Self {
		Self {
			client_id: client_id.into(),
			username: username.into(),
			password: Secret::new(password),
		}
	}

	/// Renders the login request body expected by the gateway.
	pub fn login_body(&self) -> Value {
		json!({
			"clientId": self.client_id,
			"username": self.username,
			"password": self.password.expose(),
		})
	}
}
