//! Webhook intake and the Server-Sent Events stream that rebroadcasts it.

// std
use std::{convert::Infallible, time::Duration};
// crates.io
use axum::{
	Json,
	extract::State,
	response::sse::{Event, KeepAlive, Sse},
};
use tokio_stream::{Stream, StreamExt, wrappers::BroadcastStream};
// self
use crate::{
	_prelude::*,
	server::{AppState, JsonBody},
};

/// SSE event name carried by every rebroadcast webhook.
pub const EVENT_NAME: &str = "payment-status";

const KEEP_ALIVE: Duration = Duration::from_secs(15);

// Lives inside the event stream; dropped when the client goes away.
struct ObserverLifetime;
impl Drop for ObserverLifetime {
	fn drop(&mut self) {
		tracing::info!("Observer disconnected.");
	}
}

/// `POST /relay-webhook`: rebroadcasts any JSON payload to connected observers.
pub async fn relay_webhook(
	State(state): State<AppState>,
	JsonBody(event): JsonBody<Value>,
) -> Json<Value> {
	let reached = state.broadcaster.publish(event);

	tracing::info!(reached, "Webhook received and rebroadcast.");

	Json(json!({ "ok": true }))
}

/// `GET /relay-events`: streams webhook payloads published after connecting.
pub async fn relay_events(
	State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
	let lifetime = ObserverLifetime;
	let stream = BroadcastStream::new(state.broadcaster.subscribe()).filter_map(move |item| {
		let _observer = &lifetime;

		match item {
			Ok(payload) => match Event::default().event(EVENT_NAME).json_data(&payload) {
				Ok(event) => Some(Ok(event)),
				Err(e) => {
					tracing::warn!(error = %e, "Dropping unserializable webhook event.");

					None
				},
			},
			Err(e) => {
				tracing::warn!(error = %e, "Observer lagged; skipped webhook events.");

				None
			},
		}
	});

	tracing::info!(observers = state.broadcaster.observer_count(), "Observer connected.");

	Sse::new(stream).keep_alive(KeepAlive::new().interval(KEEP_ALIVE))
}
