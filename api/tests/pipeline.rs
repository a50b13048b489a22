//! End-to-end pipeline tests against a local HTTP server

use serde_json::{json, Value};
use servir_api::{
    ApiClient, ApiConfig, ApiError, ApiSignal, BuildEnvironment, Dispatcher, FixedLanguage,
    Notification, RequestOptions, MODULE_REQUEST, RESPONSE_NOTIFICATION,
};
use servir_testing::RecordingEmitter;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(base_url: &str) -> ApiClient {
    let config = ApiConfig::for_environment(BuildEnvironment::Development).with_base_url(base_url);
    match ApiClient::new(config) {
        Ok(client) => client,
        Err(error) => unreachable!("client construction failed: {error}"),
    }
}

fn recording_options(recorder: &RecordingEmitter<ApiSignal>) -> RequestOptions {
    RequestOptions::new().with_dispatcher(Dispatcher::emit(recorder.clone()))
}

fn module_signals(signals: &[ApiSignal]) -> Vec<&ApiSignal> {
    signals
        .iter()
        .filter(|signal| signal.kind() == MODULE_REQUEST)
        .collect()
}

#[tokio::test]
async fn test_successful_get_emits_module_pair_and_event() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 1 })))
        .expect(1)
        .mount(&server)
        .await;

    let recorder = RecordingEmitter::new();
    let outcome = client_for(&server.uri())
        .get(
            "/users",
            recording_options(&recorder)
                .with_module("users")
                .with_success("USERS_LOADED"),
        )
        .await;

    assert!(outcome.is_success());
    let json: Vec<Value> = recorder.signals().iter().map(ApiSignal::to_json).collect();
    assert_eq!(
        json,
        vec![
            json!({ "type": MODULE_REQUEST, "module": "users" }),
            json!({
                "type": MODULE_REQUEST,
                "module": "users",
                "error": false,
                "response": { "id": 1 }
            }),
            json!({ "type": "USERS_LOADED", "id": 1 }),
        ]
    );
}

#[tokio::test]
async fn test_network_failure_emits_error_module_and_notification() {
    // Nothing listens on port 1.
    let recorder = RecordingEmitter::new();
    let outcome = client_for("http://127.0.0.1:1")
        .get(
            "/users",
            recording_options(&recorder)
                .with_module("users")
                .with_success("USERS_LOADED"),
        )
        .await;

    assert!(matches!(outcome, servir_api::Outcome::Failure(ApiError::Transport(_))));

    let signals = recorder.signals();
    let kinds: Vec<&str> = signals.iter().map(ApiSignal::kind).collect();
    assert_eq!(kinds, vec![MODULE_REQUEST, MODULE_REQUEST, RESPONSE_NOTIFICATION]);
    assert_eq!(
        signals[1],
        ApiSignal::ModuleRequest {
            module: "users".to_string(),
            error: Some(true),
            response: None,
        }
    );
    assert!(matches!(&signals[2], ApiSignal::Notification(Notification { error: true, .. })));
}

#[tokio::test]
async fn test_server_error_emits_error_event_with_body_fields() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/users/1"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "message": "Database unavailable" })),
        )
        .mount(&server)
        .await;

    let recorder = RecordingEmitter::new();
    let outcome = client_for(&server.uri())
        .delete(
            "/users/1",
            recording_options(&recorder)
                .with_before("USER_DELETING")
                .with_module("users")
                .with_error("USER_DELETE_FAILED")
                .with_notify(true),
        )
        .await;

    assert_eq!(outcome.error().and_then(ApiError::status_code), Some(500));

    let json: Vec<Value> = recorder.signals().iter().map(ApiSignal::to_json).collect();
    assert_eq!(
        json,
        vec![
            json!({ "type": "USER_DELETING" }),
            json!({ "type": MODULE_REQUEST, "module": "users" }),
            json!({
                "type": MODULE_REQUEST,
                "module": "users",
                "error": true,
                "response": { "message": "Database unavailable" }
            }),
            json!({ "type": "USER_DELETE_FAILED", "message": "Database unavailable" }),
            json!({
                "type": RESPONSE_NOTIFICATION,
                "error": true,
                "message": "Database unavailable",
                "status": 500
            }),
        ]
    );
}

#[tokio::test]
async fn test_success_notification_only_when_requested() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/profile"))
        .and(body_json(json!({ "name": "Ana" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "Saved" })))
        .mount(&server)
        .await;
    let client = client_for(&server.uri());

    let quiet = RecordingEmitter::new();
    let _ = client
        .put("/profile", &json!({ "name": "Ana" }), recording_options(&quiet))
        .await;
    assert!(quiet.is_empty());

    let loud = RecordingEmitter::new();
    let _ = client
        .put(
            "/profile",
            &json!({ "name": "Ana" }),
            recording_options(&loud).with_notify(true),
        )
        .await;
    assert_eq!(
        loud.signals(),
        vec![ApiSignal::Notification(Notification {
            error: false,
            message: "Saved".to_string(),
            status: Some(200),
        })]
    );
}

#[tokio::test]
async fn test_stateful_dispatcher_sends_accept_language() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orders"))
        .and(header("Accept-Language", "pt-BR"))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 42 })))
        .expect(1)
        .mount(&server)
        .await;

    let recorder = RecordingEmitter::<ApiSignal>::new();
    let options = RequestOptions::new()
        .with_success("ORDER_CREATED")
        .with_dispatcher(Dispatcher::stateful(
            recorder.clone(),
            FixedLanguage("pt-BR".to_string()),
        ));

    let outcome = client_for(&server.uri())
        .post("/orders", &json!({ "items": [1, 2] }), options)
        .await;

    assert_eq!(outcome.response().map(|r| r.status), Some(201));
    assert_eq!(
        recorder.signals().iter().map(ApiSignal::to_json).collect::<Vec<_>>(),
        vec![json!({ "type": "ORDER_CREATED", "id": 42 })]
    );
}

#[tokio::test]
async fn test_timeout_is_reported_not_raised() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let config = ApiConfig::for_environment(BuildEnvironment::Development)
        .with_base_url(server.uri())
        .with_timeout(Duration::from_millis(100));
    let client = match ApiClient::new(config) {
        Ok(client) => client,
        Err(error) => unreachable!("client construction failed: {error}"),
    };

    let recorder = RecordingEmitter::new();
    let outcome = client
        .get("/slow", recording_options(&recorder).with_module("slow"))
        .await;

    assert_eq!(
        outcome.error(),
        Some(&ApiError::Timeout(Duration::from_millis(100)))
    );
    let signals = recorder.signals();
    assert_eq!(module_signals(&signals).len(), 2);
    assert_eq!(
        signals.last().map(ApiSignal::kind),
        Some(RESPONSE_NOTIFICATION)
    );
}

#[tokio::test]
async fn test_empty_success_body_is_null() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/sessions/current"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let recorder = RecordingEmitter::new();
    let outcome = client_for(&server.uri())
        .delete(
            "/sessions/current",
            recording_options(&recorder).with_success("SIGNED_OUT"),
        )
        .await;

    assert_eq!(outcome.response().map(|r| &r.body), Some(&Value::Null));
    assert_eq!(
        recorder.signals(),
        vec![ApiSignal::Event {
            kind: "SIGNED_OUT".to_string(),
            fields: serde_json::Map::new(),
        }]
    );
}
