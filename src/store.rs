//! Process-wide token slot plus the optional file mirror.

pub mod file;

pub use file::{CachedToken, FileTokenCache, PendingWrite};

// self
use crate::{
	_prelude::*,
	auth::{Token, TokenState},
};

/// Error type produced by the token cache.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the cache.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Filesystem failure.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Owner of the single [`TokenState`].
///
/// All mutation replaces the whole state under the write lock, so a reader sees either the
/// previous complete state or the next one. The lock is never held across `.await`.
#[derive(Debug, Default)]
pub struct TokenStore {
	state: RwLock<TokenState>,
	cache: Option<FileTokenCache>,
}
impl TokenStore {
	/// Creates a store that mirrors every change into `cache`.
	pub fn with_cache(cache: FileTokenCache) -> Self {
		Self { state: Default::default(), cache: Some(cache) }
	}

	/// Returns a copy of the current state.
	pub fn snapshot(&self) -> TokenState {
		self.state.read().clone()
	}

	/// Whether authorized traffic may flow.
	pub fn is_ready(&self) -> bool {
		self.state.read().ready
	}

	/// Returns the token while the store is ready.
	pub fn current(&self) -> Option<Token> {
		self.state.read().usable_token().cloned()
	}

	/// Installs a freshly acquired token and opens the gate.
	pub fn replace(&self, token: Token) -> TokenState {
		let next = TokenState::acquired(token, OffsetDateTime::now_utc());
		let pending = {
			let mut state = self.state.write();

			*state = next.clone();

			self.stage(&next)
		};

		Self::mirror(pending);

		next
	}

	/// Drops the held token and closes the gate. Returns whether the gate was open.
	pub fn invalidate(&self) -> bool {
		let (was_ready, pending) = {
			let mut state = self.state.write();
			let was_ready = std::mem::take(&mut *state).ready;

			(was_ready, self.stage(&state))
		};

		Self::mirror(pending);

		was_ready
	}

	/// Invalidates only if `token` is still the held token.
	///
	/// A rejected call racing a rotation must not discard the replacement.
	pub fn invalidate_matching(&self, token: &Token) -> bool {
		let pending = {
			let mut state = self.state.write();

			if state.token.as_ref() != Some(token) {
				return false;
			}

			*state = TokenState::default();

			self.stage(&state)
		};

		Self::mirror(pending);

		true
	}

	/// Loads a cached token younger than `max_age`, opening the gate with it.
	///
	/// Returns `true` when a cached token was installed. The cache is a convenience mirror;
	/// the next successful login always overwrites it.
	pub fn warm_start(&self, max_age: std::time::Duration) -> Result<bool, StoreError> {
		let Some(cache) = &self.cache else {
			return Ok(false);
		};
		let Some(cached) = cache.load()? else {
			return Ok(false);
		};
		let max_age = time::Duration::try_from(max_age).unwrap_or(time::Duration::MAX);

		if OffsetDateTime::now_utc() - cached.acquired_at >= max_age || cached.token.expose().is_empty()
		{
			tracing::info!(path = %cache.path().display(), "Ignoring stale cached token.");

			return Ok(false);
		}

		tracing::info!(
			fingerprint = %cached.token.fingerprint(),
			"Warm-started token store from cache."
		);

		*self.state.write() = TokenState::acquired(cached.token, cached.acquired_at);

		Ok(true)
	}

	fn stage(&self, state: &TokenState) -> Option<PendingWrite> {
		let cache = self.cache.as_ref()?;
		let cached = match (&state.token, state.acquired_at) {
			(Some(token), Some(acquired_at)) =>
				Some(CachedToken { token: token.clone(), acquired_at }),
			_ => None,
		};

		Some(cache.stage(cached))
	}

	// Disk I/O leaves the async workers when a runtime is available.
	fn mirror(pending: Option<PendingWrite>) {
		let Some(pending) = pending else {
			return;
		};

		match tokio::runtime::Handle::try_current() {
			Ok(handle) => {
				handle.spawn_blocking(move || Self::apply(pending));
			},
			Err(_) => Self::apply(pending),
		}
	}

	fn apply(pending: PendingWrite) {
		if let Err(e) = pending.apply() {
			tracing::warn!(error = %e, "Failed to mirror token state into the cache file.");
		}
	}
}
