//! Observability helpers for token refreshes and gateway calls.
//!
//! # Feature Flags
//!
//! - Spans named `payment_relay.refresh` carry the `trigger` field (`startup`, `scheduled`,
//!   `reactive`) and are always emitted.
//! - Enable `metrics` to increment `payment_relay_refresh_total{trigger,outcome}` and
//!   `payment_relay_upstream_total{gateway,outcome}` on the global recorder.

mod metrics;
mod tracing;

pub use self::metrics::*;
pub use self::tracing::*;

// self
use crate::_prelude::*;

/// What caused a token refresh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RefreshTrigger {
	/// First tick of the schedule at process start.
	Startup,
	/// Periodic tick of the schedule.
	Scheduled,
	/// Upstream rejected the held token with 401.
	Reactive,
}
impl RefreshTrigger {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RefreshTrigger::Startup => "startup",
			RefreshTrigger::Scheduled => "scheduled",
			RefreshTrigger::Reactive => "reactive",
		}
	}
}
impl Display for RefreshTrigger {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each refresh or upstream call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
	/// Entry to the operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
	/// Caller waited behind an in-flight refresh and reused its result.
	Coalesced,
}
impl Outcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Outcome::Attempt => "attempt",
			Outcome::Success => "success",
			Outcome::Failure => "failure",
			Outcome::Coalesced => "coalesced",
		}
	}
}
impl Display for Outcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
