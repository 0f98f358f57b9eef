//! In-process fan-out of webhook events to connected observers.

// crates.io
use tokio::sync::broadcast;
// self
use crate::_prelude::*;

/// Events buffered per observer before a slow observer starts skipping.
pub const DEFAULT_CAPACITY: usize = 64;

/// Best-effort, at-most-once publisher of opaque webhook payloads.
///
/// Observers only receive events published after they subscribed. A lagging observer skips
/// what it missed instead of slowing the publisher down.
#[derive(Clone, Debug)]
pub struct Broadcaster {
	tx: broadcast::Sender<Value>,
}
impl Broadcaster {
	/// Creates a broadcaster buffering up to `capacity` events per observer.
	pub fn with_capacity(capacity: usize) -> Self {
		let (tx, _) = broadcast::channel(capacity.max(1));

		Self { tx }
	}

	/// Sends `event` to every current observer, returning how many were reached.
	pub fn publish(&self, event: Value) -> usize {
		match self.tx.send(event) {
			Ok(reached) => reached,
			Err(_) => 0,
		}
	}

	/// Registers a new observer.
	pub fn subscribe(&self) -> broadcast::Receiver<Value> {
		self.tx.subscribe()
	}

	/// Number of currently connected observers.
	pub fn observer_count(&self) -> usize {
		self.tx.receiver_count()
	}
}
impl Default for Broadcaster {
	fn default() -> Self {
		Self::with_capacity(DEFAULT_CAPACITY)
	}
}
