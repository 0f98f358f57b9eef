//! Single-flight login exchange.
//!
//! Every caller observes the refresh epoch before queueing on the guard. When the epoch has
//! moved by the time the guard is acquired, another caller completed a login in the meantime
//! and its outcome (the token now held, or none) is returned without logging in again.

// std
use std::sync::atomic::Ordering;
// self
use crate::{
	_prelude::*,
	auth::Token,
	manager::TokenManager,
	obs::{self, Outcome, RefreshSpan, RefreshTrigger},
};

impl TokenManager {
	/// Logs in and installs the new token, or clears the held token on failure.
	///
	/// The returned error is for internal callers only; HTTP callers observe failures
	/// through the readiness gate.
	pub async fn refresh(&self, trigger: RefreshTrigger) -> Result<Token> {
		let span = RefreshSpan::new(trigger);
		let observed_epoch = self.refresh_epoch.load(Ordering::Acquire);

		obs::record_refresh_outcome(trigger, Outcome::Attempt);

		let result = span
			.instrument(async move {
				let _singleflight = self.refresh_guard.lock().await;

				if self.refresh_epoch.load(Ordering::Acquire) != observed_epoch {
					self.refresh_metrics.record_coalesced();
					obs::record_refresh_outcome(trigger, Outcome::Coalesced);
					tracing::debug!("Reusing the outcome of an in-flight refresh.");

					return self.store.current().ok_or(Error::NotReady);
				}

				self.refresh_metrics.record_attempt();

				let outcome = self.payer.login(&self.credential).await;

				self.refresh_epoch.fetch_add(1, Ordering::AcqRel);

				match outcome {
					Ok(token) => {
						self.store.replace(token.clone());
						self.refresh_metrics.record_success();
						tracing::info!(fingerprint = %token.fingerprint(), "Acquired upstream token.");

						Ok(token)
					},
					Err(e) => {
						let was_ready = self.store.invalidate();

						self.refresh_metrics.record_failure();
						tracing::error!(error = %e, was_ready, "Token refresh failed; gate closed.");

						Err(e)
					},
				}
			})
			.await;

		match &result {
			Ok(_) => obs::record_refresh_outcome(trigger, Outcome::Success),
			Err(_) => obs::record_refresh_outcome(trigger, Outcome::Failure),
		}

		result
	}
}
