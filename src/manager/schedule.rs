// std
use std::time::Duration;
// crates.io
use tokio::{
	task::JoinHandle,
	time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
// self
use crate::{_prelude::*, manager::TokenManager, obs::RefreshTrigger};

/// Default interval between scheduled refreshes (55 minutes).
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(55 * 60);

impl TokenManager {
	/// Spawns the periodic refresh task.
	///
	/// The first refresh runs immediately; later ones follow every `interval` regardless of
	/// the previous outcome. The task exits once `shutdown` is cancelled.
	pub fn spawn_refresh_schedule(
		self: &Arc<Self>,
		interval: Duration,
		shutdown: CancellationToken,
	) -> JoinHandle<()> {
		let manager = Arc::clone(self);

		tokio::spawn(async move { manager.run_refresh_schedule(interval, shutdown).await })
	}

	async fn run_refresh_schedule(&self, interval: Duration, shutdown: CancellationToken) {
		let mut ticker = time::interval(interval);
		let mut trigger = RefreshTrigger::Startup;

		ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

		loop {
			tokio::select! {
				_ = shutdown.cancelled() => {
					tracing::info!("Refresh schedule stopped.");

					return;
				}
				_ = ticker.tick() => {
					if let Err(e) = self.refresh(trigger).await {
						tracing::warn!(error = %e, %trigger, "Scheduled refresh failed; retrying next tick.");
					}

					trigger = RefreshTrigger::Scheduled;
				}
			}
		}
	}
}
