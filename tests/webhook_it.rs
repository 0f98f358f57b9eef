// std
use std::time::Duration;
// crates.io
use axum::{
	Router,
	body::Body,
	http::{HeaderValue, Request, StatusCode, header},
};
use tokio_stream::StreamExt;
use tower::ServiceExt;
// self
use payment_relay::{
	_preludet::*,
	server::{self, AppState},
};

const UNREACHABLE: &str = "http://127.0.0.1:9/";

fn router(state: &AppState) -> Router {
	server::create_router(state.clone(), HeaderValue::from_static("http://localhost:3000"))
}

fn webhook(body: &'static str) -> Request<Body> {
	Request::post("/relay-webhook").body(Body::from(body)).expect("Request should build.")
}

#[tokio::test]
async fn events_stream_receives_webhooks_published_after_connecting() {
	let state = build_test_state(UNREACHABLE);
	let response = router(&state)
		.oneshot(Request::get("/relay-events").body(Body::empty()).expect("Request should build."))
		.await
		.expect("Router should answer.");

	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(
		response.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
		Some("text/event-stream"),
	);
	assert_eq!(state.broadcaster.observer_count(), 1);

	let ack = router(&state)
		.oneshot(webhook(r#"{"correlationId":"c-1","status":"APPROVED"}"#))
		.await
		.expect("Router should answer.");

	assert_eq!(ack.status(), StatusCode::OK);

	let mut frames = response.into_body().into_data_stream();
	let frame = tokio::time::timeout(Duration::from_secs(2), frames.next())
		.await
		.expect("Event should arrive before the timeout.")
		.expect("Stream should yield a frame.")
		.expect("Frame should be readable.");
	let text = String::from_utf8(frame.to_vec()).expect("Frame should be UTF-8.");

	assert!(text.contains("event: payment-status"), "Unexpected frame: {text}");
	assert!(
		text.contains(r#"data: {"correlationId":"c-1","status":"APPROVED"}"#),
		"Unexpected frame: {text}"
	);
}

#[tokio::test]
async fn webhook_accepts_empty_body_and_reaches_every_observer() {
	let state = build_test_state(UNREACHABLE);
	let mut first = state.broadcaster.subscribe();
	let mut second = state.broadcaster.subscribe();
	let response = router(&state).oneshot(webhook("")).await.expect("Router should answer.");

	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(first.recv().await.expect("First observer should receive."), json!({}));
	assert_eq!(second.recv().await.expect("Second observer should receive."), json!({}));
}

#[tokio::test]
async fn malformed_webhook_is_rejected() {
	let state = build_test_state(UNREACHABLE);
	let mut observer = state.broadcaster.subscribe();
	let response = router(&state).oneshot(webhook("{oops")).await.expect("Router should answer.");

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert!(observer.try_recv().is_err());
}

#[tokio::test]
async fn closing_the_events_stream_releases_the_observer() {
	let state = build_test_state(UNREACHABLE);
	let response = router(&state)
		.oneshot(Request::get("/relay-events").body(Body::empty()).expect("Request should build."))
		.await
		.expect("Router should answer.");

	assert_eq!(state.broadcaster.observer_count(), 1);

	drop(response);

	assert_eq!(state.broadcaster.observer_count(), 0);

	let ack = router(&state)
		.oneshot(webhook(r#"{"status":"late"}"#))
		.await
		.expect("Router should answer.");

	assert_eq!(ack.status(), StatusCode::OK);
}
