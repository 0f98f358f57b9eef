// crates.io
use axum::{
	Router,
	body::{self, Body},
	http::{HeaderValue, Request, StatusCode},
};
use httpmock::prelude::*;
use tower::ServiceExt;
// self
use payment_relay::{
	_preludet::*,
	auth::Token,
	server::{self, AppState},
};

fn ready_state(upstream: &MockServer, token: &str) -> AppState {
	let state = build_test_state(&upstream.base_url());

	state.manager.store.replace(Token::new(token));

	state
}

async fn call(state: &AppState, request: Request<Body>) -> (StatusCode, Value) {
	let app: Router =
		server::create_router(state.clone(), HeaderValue::from_static("http://localhost:3000"));
	let response = app.oneshot(request).await.expect("Router should answer.");
	let status = response.status();
	let bytes =
		body::to_bytes(response.into_body(), usize::MAX).await.expect("Body should be readable.");

	(status, serde_json::from_slice(&bytes).expect("Response should be JSON."))
}

fn post(path: &str, body: Value) -> Request<Body> {
	Request::post(path)
		.header("content-type", "application/json")
		.body(Body::from(body.to_string()))
		.expect("Request should build.")
}

#[tokio::test]
async fn relay_payment_forwards_body_with_bearer() {
	let upstream = MockServer::start_async().await;
	let payment = upstream
		.mock_async(|when, then| {
			when.method(POST)
				.path("/payments")
				.header("authorization", "Bearer live")
				.json_body(json!({ "amount": 1500, "receiver": "pinpad-1" }));
			then.status(201).json_body(json!({ "correlationId": "corr-9" }));
		})
		.await;
	let state = ready_state(&upstream, "live");
	let (status, body) =
		call(&state, post("/relay-payment", json!({ "amount": 1500, "receiver": "pinpad-1" })))
			.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body, json!({ "correlationId": "corr-9" }));

	payment.assert_calls_async(1).await;
}

#[tokio::test]
async fn payer_rejection_passes_status_and_body_through() {
	let upstream = MockServer::start_async().await;

	upstream
		.mock_async(|when, then| {
			when.method(POST).path("/payments");
			then.status(422).json_body(json!({ "code": "INVALID_AMOUNT" }));
		})
		.await;

	let state = ready_state(&upstream, "live");
	let (status, body) = call(&state, post("/relay-payment", json!({ "amount": -1 }))).await;

	assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
	assert_eq!(body, json!({ "code": "INVALID_AMOUNT" }));
	assert!(state.manager.is_ready(), "Non-401 rejections must keep the gate open.");
}

#[tokio::test]
async fn status_401_passes_through_and_refreshes_token() {
	let upstream = MockServer::start_async().await;
	let rejected = upstream
		.mock_async(|when, then| {
			when.method(GET)
				.path("/payments/status")
				.query_param("correlationId", "corr-1")
				.query_param("automationName", "totem")
				.header("authorization", "Bearer expired");
			then.status(401).json_body(json!({ "message": "token expired" }));
		})
		.await;
	let login = upstream
		.mock_async(|when, then| {
			when.method(POST).path("/auth/login");
			then.status(200).json_body(json!({ "token": "renewed" }));
		})
		.await;
	let state = ready_state(&upstream, "expired");
	let request = Request::get("/relay-status/corr-1/totem")
		.body(Body::empty())
		.expect("Request should build.");
	let (status, body) = call(&state, request).await;

	assert_eq!(status, StatusCode::UNAUTHORIZED);
	assert_eq!(body, json!({ "message": "token expired" }));
	assert_eq!(
		state.manager.store.current().map(|t| t.expose().to_owned()),
		Some("renewed".to_owned()),
	);

	rejected.assert_calls_async(1).await;
	login.assert_calls_async(1).await;
}

#[tokio::test]
async fn status_401_with_failing_login_closes_gate() {
	let upstream = MockServer::start_async().await;

	upstream
		.mock_async(|when, then| {
			when.method(GET).path("/payments/status");
			then.status(401).json_body(json!({ "message": "token expired" }));
		})
		.await;
	upstream
		.mock_async(|when, then| {
			when.method(POST).path("/auth/login");
			then.status(503).body("maintenance");
		})
		.await;

	let state = ready_state(&upstream, "expired");
	let status_request =
		Request::get("/relay-status/c/a").body(Body::empty()).expect("Request should build.");
	let (status, _) = call(&state, status_request).await;

	assert_eq!(status, StatusCode::UNAUTHORIZED);
	assert!(!state.manager.is_ready());

	let (status, body) = call(&state, post("/relay-payment", json!({}))).await;

	assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
	assert_eq!(
		body,
		json!({ "error": "Service not ready: upstream token has not been acquired." }),
	);
}

#[tokio::test]
async fn abort_requires_identifiers_before_calling_upstream() {
	let upstream = MockServer::start_async().await;
	let command = upstream
		.mock_async(|when, then| {
			when.method(POST).path("/payments/command");
			then.status(200).json_body(json!({}));
		})
		.await;
	let state = ready_state(&upstream, "live");
	let (status, body) = call(
		&state,
		post("/relay-abort", json!({ "correlationId": "c-1", "automationName": "totem" })),
	)
	.await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body, json!({ "error": "Missing required field `receiver`." }));

	command.assert_calls_async(0).await;
}

#[tokio::test]
async fn abort_sends_envelope_and_acknowledges() {
	let upstream = MockServer::start_async().await;
	let command = upstream
		.mock_async(|when, then| {
			when.method(POST)
				.path("/payments/command")
				.header("authorization", "Bearer live")
				.json_body(json!({
					"correlationId": "c-1",
					"automationName": "totem",
					"receiver": "pinpad-3",
					"command": "ABORT",
					"callbackUrl": "http://relay.test/relay-webhook",
				}));
			then.status(202).json_body(json!({ "accepted": true }));
		})
		.await;
	let state = ready_state(&upstream, "live");
	let (status, body) = call(
		&state,
		post(
			"/relay-abort",
			json!({ "correlationId": "c-1", "automationName": "totem", "receiver": "pinpad-3" }),
		),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["acknowledged"], json!(true));
	assert_eq!(body["upstream"], json!({ "accepted": true }));
	assert!(body["note"].as_str().is_some_and(|note| note.contains("acknowledged")));

	command.assert_calls_async(1).await;
}

#[tokio::test]
async fn unreachable_payer_yields_generic_500() {
	let state = build_test_state("http://127.0.0.1:9/");

	state.manager.store.replace(Token::new("live"));

	let (status, body) = call(&state, post("/relay-payment", json!({}))).await;

	assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
	assert_eq!(body, json!({ "error": "No response received from upstream." }));
}
