//! Bearer token issued by the login exchange and the state snapshot that owns it.

// crates.io
use sha2::{Digest, Sha256};
// self
use crate::{_prelude::*, auth::Secret};

const FINGERPRINT_BYTES: usize = 6;

/// Opaque bearer token. Formatting never reveals the value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(Secret);
impl Token {
	/// Wraps a raw token value.
	pub fn new(value: impl Into<String>) -> Self {
		Self(Secret::new(value))
	}

	/// Returns the raw token. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		self.0.expose()
	}

	/// Short hex digest that identifies a token in logs without leaking it.
	pub fn fingerprint(&self) -> String {
		let digest = Sha256::digest(self.expose().as_bytes());

		digest[..FINGERPRINT_BYTES].iter().map(|byte| format!("{byte:02x}")).collect()
	}
}
impl Debug for Token {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("Token").field(&self.fingerprint()).finish()
	}
}
impl Display for Token {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Snapshot of the process-wide token slot.
///
/// `ready` is only ever `true` together with a token; the store replaces the whole value
/// in one write so readers never observe a token without its readiness flag.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenState {
	/// Currently held bearer token.
	pub token: Option<Token>,
	/// Whether authorized traffic may flow.
	pub ready: bool,
	/// Instant the token was acquired.
	pub acquired_at: Option<OffsetDateTime>,
}
impl TokenState {
	/// State holding a freshly acquired token.
	pub fn acquired(token: Token, acquired_at: OffsetDateTime) -> Self {
		Self { token: Some(token), ready: true, acquired_at: Some(acquired_at) }
	}

	/// Returns the token only while the state is ready.
	pub fn usable_token(&self) -> Option<&Token> {
		self.token.as_ref().filter(|_| self.ready)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn token_formatters_hide_value() {
		let token = Token::new("eyJhbGciOi.secret");

		assert!(!format!("{token:?}").contains("secret"));
		assert_eq!(format!("{token}"), "<redacted>");
		assert_eq!(token.fingerprint().len(), FINGERPRINT_BYTES * 2);
		assert_eq!(token.fingerprint(), Token::new("eyJhbGciOi.secret").fingerprint());
	}

	#[test]
	fn default_state_is_not_ready() {
		let state = TokenState::default();

		assert!(!state.ready);
		assert!(state.usable_token().is_none());

		let acquired = TokenState::acquired(Token::new("abc"), OffsetDateTime::now_utc());

		assert_eq!(acquired.usable_token().map(Token::expose), Some("abc"));
	}
}
