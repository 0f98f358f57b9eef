//! Payment relay binary.
//!
//! Reads configuration from the environment (see `payment_relay::config`), starts the token
//! refresh schedule, and serves the HTTP surface until Ctrl+C or SIGTERM.

// crates.io
use payment_relay::{
	config::{RelayConfig, SystemEnv},
	obs, server,
};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	obs::init_tracing();

	let config = RelayConfig::from_env(&SystemEnv)?;

	tracing::info!(
		listen = %config.listen,
		controlpay = %config.controlpay.base_url,
		payer = %config.payer.base_url,
		refresh_interval_secs = config.refresh_interval.as_secs(),
		"Starting payment relay."
	);

	server::run(config).await?;

	Ok(())
}
