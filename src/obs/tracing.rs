// crates.io
use tracing_subscriber::EnvFilter;
// self
use crate::{_prelude::*, obs::RefreshTrigger};

/// Filter applied when `RUST_LOG` is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Installs the global fmt subscriber filtered by `RUST_LOG`.
pub fn init_tracing() {
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

	tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Span wrapper used by every token refresh.
#[derive(Clone, Debug)]
pub struct RefreshSpan {
	span: tracing::Span,
}
impl RefreshSpan {
	/// Creates a span tagged with the refresh trigger.
	pub fn new(trigger: RefreshTrigger) -> Self {
		Self { span: tracing::info_span!("payment_relay.refresh", trigger = trigger.as_str()) }
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> tracing::instrument::Instrumented<Fut>
	where
		Fut: Future,
	{
		use tracing::Instrument;

		fut.instrument(self.span.clone())
	}
}
