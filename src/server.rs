//! HTTP surface: routing, the readiness gate, and the process lifecycle.
//!
//! Gateway routes sit behind [`gate::require_ready`]. Probes and the webhook fan-out stay
//! reachable while no token is held so that operators and observers can still connect.

pub mod error;
pub mod extract;
pub mod gate;
pub mod handlers;

pub use error::ApiError;
pub use extract::JsonBody;

// crates.io
use axum::{
	Router,
	http::{HeaderValue, Method, header},
	middleware,
	routing::{get, post},
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
// self
use crate::{
	_prelude::*,
	broadcast::Broadcaster,
	config::RelayConfig,
	gateway::{self, controlpay::ControlPayClient, payer::PayerClient},
	http::ReqwestHttpClient,
	manager::TokenManager,
	store::{FileTokenCache, TokenStore},
};

const WEBHOOK_PATH: &str = "relay-webhook";

/// Per-deployment values applied to requests that omit them.
#[derive(Clone, Debug)]
pub struct RelayDefaults {
	/// Terminal used when a listing request names none.
	pub terminal_id: String,
	/// Technical password used when a cancellation carries none.
	pub technical_password: String,
	/// Public base URL of this relay.
	pub public_url: Url,
}
impl RelayDefaults {
	/// Bundles the defaults.
	pub fn new(
		terminal_id: impl Into<String>,
		technical_password: impl Into<String>,
		public_url: Url,
	) -> Self {
		Self {
			terminal_id: terminal_id.into(),
			technical_password: technical_password.into(),
			public_url,
		}
	}

	/// Webhook URL handed to Payer for command callbacks.
	pub fn callback_url(&self) -> Result<Url> {
		gateway::endpoint(&self.public_url, WEBHOOK_PATH)
	}
}

/// Shared state handed to every handler.
#[derive(Clone, Debug)]
pub struct AppState {
	/// Token lifecycle owner.
	pub manager: Arc<TokenManager>,
	/// ControlPay client.
	pub controlpay: Arc<ControlPayClient>,
	/// Payer client used for authorized calls.
	pub payer: Arc<PayerClient>,
	/// Webhook fan-out.
	pub broadcaster: Broadcaster,
	/// Request defaults.
	pub defaults: Arc<RelayDefaults>,
}
impl AppState {
	/// Assembles the state.
	pub fn new(
		manager: Arc<TokenManager>,
		controlpay: ControlPayClient,
		payer: PayerClient,
		broadcaster: Broadcaster,
		defaults: RelayDefaults,
	) -> Self {
		Self {
			manager,
			controlpay: Arc::new(controlpay),
			payer: Arc::new(payer),
			broadcaster,
			defaults: Arc::new(defaults),
		}
	}
}

/// Builds the router with every route, the readiness gate, tracing, and CORS.
pub fn create_router(state: AppState, allowed_origin: HeaderValue) -> Router {
	let open_routes = Router::new()
		.route("/health", get(handlers::health::health))
		.route("/ready", get(handlers::health::ready))
		.route("/relay-webhook", post(handlers::events::relay_webhook))
		.route("/relay-events", get(handlers::events::relay_events));
	let gated_routes = Router::new()
		.route("/api/payment-init", post(handlers::controlpay::payment_init))
		.route("/payment-status/{id}", get(handlers::controlpay::payment_status))
		.route("/payment-list", post(handlers::controlpay::payment_list))
		.route("/payment-cancel", post(handlers::controlpay::payment_cancel))
		.route("/relay-payment", post(handlers::payer::relay_payment))
		.route(
			"/relay-status/{correlation_id}/{automation_name}",
			get(handlers::payer::relay_status),
		)
		.route("/relay-abort", post(handlers::payer::relay_abort))
		.layer(middleware::from_fn_with_state(state.clone(), gate::require_ready));
	let cors = CorsLayer::new()
		.allow_origin(allowed_origin)
		.allow_methods([Method::GET, Method::POST, Method::OPTIONS])
		.allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

	Router::new()
		.merge(open_routes)
		.merge(gated_routes)
		.layer(TraceLayer::new_for_http())
		.layer(cors)
		.with_state(state)
}

/// Wires every component from `config` and serves until a shutdown signal arrives.
pub async fn run(config: RelayConfig) -> Result<()> {
	let http_client = ReqwestHttpClient::with_timeout(config.upstream_timeout)?;
	let store = match &config.token_cache_path {
		Some(path) => TokenStore::with_cache(FileTokenCache::open(path)?),
		None => TokenStore::default(),
	};

	if let Err(e) = store.warm_start(config.refresh_interval) {
		tracing::warn!(error = %e, "Ignoring unreadable token cache.");
	}

	let payer = PayerClient::new(http_client.clone(), config.payer.base_url.clone());
	let manager = Arc::new(TokenManager::new(Arc::new(store), payer.clone(), config.payer.credential));
	let controlpay = ControlPayClient::new(
		http_client,
		config.controlpay.base_url,
		config.controlpay.api_key,
	);
	let defaults = RelayDefaults::new(
		config.default_terminal_id,
		config.default_technical_password,
		config.public_url,
	);
	let state = AppState::new(
		Arc::clone(&manager),
		controlpay,
		payer,
		Broadcaster::default(),
		defaults,
	);
	let shutdown = CancellationToken::new();
	let schedule = manager.spawn_refresh_schedule(config.refresh_interval, shutdown.clone());
	let app = create_router(state, config.allowed_origin);
	let listener = TcpListener::bind(config.listen).await?;

	tracing::info!(addr = %config.listen, "Payment relay listening.");

	let served = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await;

	shutdown.cancel();

	if let Err(e) = schedule.await {
		tracing::warn!(error = %e, "Refresh schedule ended abnormally.");
	}

	served?;

	tracing::info!("Payment relay stopped.");

	Ok(())
}

async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(e) = tokio::signal::ctrl_c().await {
			tracing::error!(error = %e, "Failed to install Ctrl+C handler.");
		}
	};
	#[cfg(unix)]
	let terminate = async {
		match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
			Ok(mut signal) => {
				signal.recv().await;
			},
			Err(e) => tracing::error!(error = %e, "Failed to install SIGTERM handler."),
		}
	};
	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		() = ctrl_c => tracing::info!("Received Ctrl+C; shutting down."),
		() = terminate => tracing::info!("Received SIGTERM; shutting down."),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn callback_url_points_at_webhook_route() {
		let defaults = RelayDefaults::new(
			"4517",
			"111111",
			Url::parse("https://relay.example.com/base/").expect("URL must parse."),
		);

		assert_eq!(
			defaults.callback_url().expect("Callback URL must build.").as_str(),
			"https://relay.example.com/base/relay-webhook",
		);
	}
}
