//! Token lifecycle manager: login, scheduled and reactive refresh, and the authorized call
//! wrapper.
//!
//! [`TokenManager`] owns the credential, the Payer client used for the login exchange, and
//! the shared [`TokenStore`]. Its behavior is split across submodules that each add an
//! `impl TokenManager` block:
//!
//! - `login` performs the single-flight refresh and records its outcome.
//! - `schedule` drives the periodic refresh task until shutdown.
//! - `authorized` wraps bearer-authenticated calls and reacts to 401 rejections.

mod authorized;
mod login;
mod metrics;
mod schedule;

pub use self::metrics::{RefreshMetrics, RefreshMetricsSnapshot};
pub use self::schedule::DEFAULT_REFRESH_INTERVAL;

// std
use std::sync::atomic::AtomicU64;
// self
use crate::{_prelude::*, auth::Credential, gateway::payer::PayerClient, store::TokenStore};

/// Owner of the process-wide bearer token lifecycle.
pub struct TokenManager {
	/// Shared token slot consulted by the gate and the authorized wrapper.
	pub store: Arc<TokenStore>,
	/// Client used for the login exchange.
	pub payer: PayerClient,
	/// Credential presented on every login.
	pub credential: Credential,
	/// Counters for refresh outcomes.
	pub refresh_metrics: Arc<RefreshMetrics>,
	refresh_guard: AsyncMutex<()>,
	refresh_epoch: AtomicU64,
}
impl TokenManager {
	/// Creates a manager around an existing store.
	pub fn new(store: Arc<TokenStore>, payer: PayerClient, credential: Credential) -> Self {
		Self {
			store,
			payer,
			credential,
			refresh_metrics: Default::default(),
			refresh_guard: AsyncMutex::new(()),
			refresh_epoch: AtomicU64::new(0),
		}
	}

	/// Whether authorized traffic may flow.
	pub fn is_ready(&self) -> bool {
		self.store.is_ready()
	}
}
impl Debug for TokenManager {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenManager")
			.field("ready", &self.store.is_ready())
			.field("client_id", &self.credential.client_id)
			.field("refresh_metrics", &self.refresh_metrics)
			.finish_non_exhaustive()
	}
}
