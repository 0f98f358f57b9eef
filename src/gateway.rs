//! Upstream gateway clients.
//!
//! Both clients are stateless request builders over the shared
//! [`ReqwestHttpClient`](crate::http::ReqwestHttpClient): they validate the envelope,
//! shape the payload, attach credentials, and hand back the upstream body untouched. A
//! non-2xx answer becomes [`Error::Upstream`](crate::error::Error::Upstream); nothing here
//! ever fabricates a success.

pub mod controlpay;
pub mod normalize;
pub mod payer;

// self
use crate::{_prelude::*, error::ConfigError};

/// Gateway labels used in logs and metrics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Gateway {
	/// ControlPay (API-key authenticated).
	ControlPay,
	/// Payer (bearer-token authenticated).
	Payer,
}
impl Gateway {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Gateway::ControlPay => "controlpay",
			Gateway::Payer => "payer",
		}
	}
}
impl Display for Gateway {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Joins a relative endpoint path onto a gateway base URL.
pub(crate) fn endpoint(base: &Url, path: &'static str) -> Result<Url> {
	base.join(path).map_err(|source| ConfigError::InvalidEndpoint { path, source }.into())
}

/// Returns the field when it carries a usable value (not null, not an empty string).
pub(crate) fn present(value: Option<Value>) -> Option<Value> {
	value.filter(|v| match v {
		Value::Null => false,
		Value::String(s) => !s.trim().is_empty(),
		_ => true,
	})
}

/// Like [`present`], failing with a validation error that names `field`.
pub(crate) fn require(value: Option<Value>, field: &str) -> Result<Value> {
	present(value).ok_or_else(|| Error::missing_field(field))
}
