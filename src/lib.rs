//! Token-aware relay between browser clients and the ControlPay and Payer payment gateways:
//! a process-wide bearer token with scheduled and reactive refresh, a readiness gate, and
//! webhook fan-out to connected observers.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod broadcast;
pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod manager;
pub mod obs;
pub mod server;
pub mod store;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::Credential,
		broadcast::Broadcaster,
		gateway::{controlpay::ControlPayClient, payer::PayerClient},
		http::ReqwestHttpClient,
		manager::TokenManager,
		server::{AppState, RelayDefaults},
		store::TokenStore,
	};

	/// API key injected into every ControlPay request built by the test helpers.
	pub const TEST_CONTROLPAY_KEY: &str = "test-controlpay-key";
	/// Public base URL used to derive the abort callback in tests.
	pub const TEST_PUBLIC_URL: &str = "http://relay.test/";

	/// Builds a reqwest HTTP client with a short timeout suitable for mock upstreams.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		ReqwestHttpClient::with_timeout(std::time::Duration::from_secs(5))
			.expect("Failed to build Reqwest client for tests.")
	}

	/// Credential fixture used by every test login exchange.
	pub fn test_credential() -> Credential {
		Credential::new("client-test", "user-test", "password-test")
	}

	/// Parses a mock server base URL, appending the trailing slash joins rely on.
	pub fn test_base_url(base: &str) -> Url {
		let mut raw = base.to_owned();

		if !raw.ends_with('/') {
			raw.push('/');
		}

		Url::parse(&raw).expect("Failed to parse mock upstream base URL.")
	}

	/// Constructs a [`TokenManager`] whose login exchange targets `payer_base`.
	pub fn build_test_manager(payer_base: &str) -> Arc<TokenManager> {
		let payer = PayerClient::new(test_reqwest_http_client(), test_base_url(payer_base));
		let store = Arc::new(TokenStore::default());

		Arc::new(TokenManager::new(store, payer, test_credential()))
	}

	/// Constructs a full [`AppState`] with both gateways pointing at `upstream_base`.
	pub fn build_test_state(upstream_base: &str) -> AppState {
		let http_client = test_reqwest_http_client();
		let manager = build_test_manager(upstream_base);
		let controlpay = ControlPayClient::new(
			http_client.clone(),
			test_base_url(upstream_base),
			TEST_CONTROLPAY_KEY,
		);
		let payer = PayerClient::new(http_client, test_base_url(upstream_base));
		let defaults = RelayDefaults::new(
			"4517",
			"111111",
			Url::parse(TEST_PUBLIC_URL).expect("Failed to parse test public URL."),
		);

		AppState::new(manager, controlpay, payer, Broadcaster::default(), defaults)
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::RwLock;
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::{Map, Value, json};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
// Binary-only dependency.
use color_eyre as _;
#[cfg(test)] use {httpmock as _, tower as _};
