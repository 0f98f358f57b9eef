// self
use crate::{_prelude::*, auth::Token, manager::TokenManager, obs::RefreshTrigger};

impl TokenManager {
	/// Runs `call` with the held bearer token.
	///
	/// Fails with [`Error::NotReady`] without calling out when no token is held. When the
	/// upstream answers 401 the token is dropped, the gate closes, and a reactive refresh is
	/// awaited before the original upstream error is returned.
	pub async fn authorized<F, Fut, T>(&self, call: F) -> Result<T>
	where
		F: FnOnce(Token) -> Fut,
		Fut: Future<Output = Result<T>>,
	{
		let token = self.store.current().ok_or(Error::NotReady)?;
		let result = call(token.clone()).await;

		if matches!(&result, Err(e) if e.is_unauthorized()) {
			self.recover_from_rejection(&token).await;
		}

		result
	}

	async fn recover_from_rejection(&self, rejected: &Token) {
		let invalidated = self.store.invalidate_matching(rejected);

		if !invalidated && self.store.is_ready() {
			tracing::debug!("Rejected token was already rotated; skipping reactive refresh.");

			return;
		}

		tracing::warn!(fingerprint = %rejected.fingerprint(), "Upstream rejected the token; refreshing.");

		if let Err(e) = self.refresh(RefreshTrigger::Reactive).await {
			tracing::error!(error = %e, "Reactive refresh failed.");
		}
	}
}
