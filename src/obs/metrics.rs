// self
use crate::{
	_prelude::*,
	gateway::Gateway,
	obs::{Outcome, RefreshTrigger},
};

/// Records a refresh outcome via the global metrics recorder (when enabled).
pub fn record_refresh_outcome(trigger: RefreshTrigger, outcome: Outcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"payment_relay_refresh_total",
			"trigger" => trigger.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (trigger, outcome);
	}
}

/// Records an upstream call outcome via the global metrics recorder (when enabled).
pub fn record_upstream_outcome(gateway: Gateway, outcome: Outcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"payment_relay_upstream_total",
			"gateway" => gateway.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (gateway, outcome);
	}
}

/// Records the outcome of a finished upstream call.
pub fn record_upstream_result<T>(gateway: Gateway, result: &Result<T>) {
	let outcome = if result.is_ok() { Outcome::Success } else { Outcome::Failure };

	record_upstream_outcome(gateway, outcome);
}
