use std::collections::VecDeque;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use shared::llm::{
    ChatMessage, LlmGateway, LlmGatewayError, LlmGatewayRequest, OpenAiGateway,
    OpenAiGatewayConfig,
};
use tokio::net::TcpListener;
use tokio::sync::{Mutex, oneshot};

#[derive(Debug, Clone)]
struct MockReply {
    status: StatusCode,
    body: Value,
    delay_ms: u64,
}

#[derive(Debug, Clone)]
struct TestServerState {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    seen_payloads: Arc<Mutex<Vec<Value>>>,
    seen_auth_headers: Arc<Mutex<Vec<String>>>,
}

impl TestServerState {
    fn with_replies(replies: Vec<MockReply>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::from(replies))),
            seen_payloads: Arc::new(Mutex::new(Vec::new())),
            seen_auth_headers: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[tokio::test]
async fn sends_model_messages_and_bearer_and_parses_first_choice() {
    let state = TestServerState::with_replies(vec![ok_reply(success_response_body(
        "gpt-3.5-turbo-0125",
        &["yes", "no"],
    ))]);
    let (url, shutdown_tx, server_task) = spawn_test_server(state.clone()).await;

    let gateway = OpenAiGateway::new(config_for(url, None)).expect("gateway should build");
    let response = gateway
        .generate(
            LlmGatewayRequest::new(vec![
                ChatMessage::system("answer yes or no"),
                ChatMessage::user("Is a hamster a pet?"),
            ])
            .with_temperature(0.0),
        )
        .await
        .expect("request should succeed");

    shutdown_tx.send(()).expect("shutdown signal should send");
    server_task.await.expect("server task should join");

    assert_eq!(response.content, "yes");
    assert_eq!(response.model, "gpt-3.5-turbo-0125");
    assert_eq!(response.provider_request_id.as_deref(), Some("chatcmpl-test"));
    assert_eq!(
        response.usage.map(|usage| usage.total_tokens),
        Some(20)
    );

    let payloads = state.seen_payloads.lock().await.clone();
    assert_eq!(
        payloads,
        vec![json!({
            "model": "test-model",
            "messages": [
                { "role": "system", "content": "answer yes or no" },
                { "role": "user", "content": "Is a hamster a pet?" }
            ],
            "temperature": 0.0
        })]
    );

    let auth_headers = state.seen_auth_headers.lock().await.clone();
    assert_eq!(auth_headers, vec!["Bearer test-openai-key".to_string()]);
}

#[tokio::test]
async fn omits_temperature_when_unset() {
    let state = TestServerState::with_replies(vec![ok_reply(success_response_body(
        "test-model",
        &["Cats sleep a lot."],
    ))]);
    let (url, shutdown_tx, server_task) = spawn_test_server(state.clone()).await;

    let gateway = OpenAiGateway::new(config_for(url, None)).expect("gateway should build");
    gateway
        .generate(LlmGatewayRequest::new(vec![ChatMessage::user(
            "Why do cats sleep so much?",
        )]))
        .await
        .expect("request should succeed");

    shutdown_tx.send(()).expect("shutdown signal should send");
    server_task.await.expect("server task should join");

    let payloads = state.seen_payloads.lock().await.clone();
    assert_eq!(payloads.len(), 1);
    assert!(payloads[0].get("temperature").is_none());
    assert_eq!(payloads[0]["messages"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn unauthorized_status_is_a_provider_failure_without_retry() {
    let state = TestServerState::with_replies(vec![MockReply {
        status: StatusCode::UNAUTHORIZED,
        body: json!({
            "error": {
                "message": "Incorrect API key provided",
                "type": "invalid_request_error",
                "code": "invalid_api_key"
            }
        }),
        delay_ms: 0,
    }]);
    let (url, shutdown_tx, server_task) = spawn_test_server(state.clone()).await;

    let gateway = OpenAiGateway::new(config_for(url, None)).expect("gateway should build");
    let err = gateway
        .generate(LlmGatewayRequest::new(vec![ChatMessage::user("hello")]))
        .await
        .expect_err("unauthorized should fail");

    shutdown_tx.send(()).expect("shutdown signal should send");
    server_task.await.expect("server task should join");

    assert!(
        matches!(err, LlmGatewayError::ProviderFailure(ref message)
            if message.contains("status=401") && message.contains("invalid_api_key")),
        "unexpected error: {err:?}"
    );
    assert_eq!(state.seen_payloads.lock().await.len(), 1);
}

#[tokio::test]
async fn empty_choice_list_is_an_invalid_payload() {
    let state = TestServerState::with_replies(vec![ok_reply(success_response_body(
        "test-model",
        &[],
    ))]);
    let (url, shutdown_tx, server_task) = spawn_test_server(state).await;

    let gateway = OpenAiGateway::new(config_for(url, None)).expect("gateway should build");
    let err = gateway
        .generate(LlmGatewayRequest::new(vec![ChatMessage::user("hello")]))
        .await
        .expect_err("missing choice should fail");

    shutdown_tx.send(()).expect("shutdown signal should send");
    server_task.await.expect("server task should join");

    assert!(
        matches!(err, LlmGatewayError::InvalidProviderPayload(ref code) if code == "missing_choice"),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn null_content_and_malformed_json_are_invalid_payloads() {
    let state = TestServerState::with_replies(vec![
        ok_reply(json!({
            "choices": [{ "message": { "role": "assistant", "content": null } }]
        })),
        ok_reply(json!({ "unexpected": true })),
    ]);
    let (url, shutdown_tx, server_task) = spawn_test_server(state).await;

    let gateway = OpenAiGateway::new(config_for(url, None)).expect("gateway should build");
    let null_content = gateway
        .generate(LlmGatewayRequest::new(vec![ChatMessage::user("hello")]))
        .await
        .expect_err("null content should fail");
    let malformed = gateway
        .generate(LlmGatewayRequest::new(vec![ChatMessage::user("hello")]))
        .await
        .expect_err("missing choices should fail");

    shutdown_tx.send(()).expect("shutdown signal should send");
    server_task.await.expect("server task should join");

    assert!(
        matches!(null_content, LlmGatewayError::InvalidProviderPayload(ref code) if code == "missing_content"),
        "unexpected error: {null_content:?}"
    );
    assert!(
        matches!(malformed, LlmGatewayError::InvalidProviderPayload(ref code) if code == "response_json_parse_failed"),
        "unexpected error: {malformed:?}"
    );
}

#[tokio::test]
async fn configured_timeout_maps_to_timeout_error() {
    let state = TestServerState::with_replies(vec![MockReply {
        status: StatusCode::OK,
        body: success_response_body("test-model", &["yes"]),
        delay_ms: 500,
    }]);
    let (url, shutdown_tx, server_task) = spawn_test_server(state).await;

    let gateway = OpenAiGateway::new(config_for(url, Some(50))).expect("gateway should build");
    let err = gateway
        .generate(LlmGatewayRequest::new(vec![ChatMessage::user("hello")]))
        .await
        .expect_err("slow provider should time out");

    shutdown_tx.send(()).expect("shutdown signal should send");
    server_task.await.expect("server task should join");

    assert!(
        matches!(err, LlmGatewayError::Timeout),
        "unexpected error: {err:?}"
    );
}

fn config_for(chat_completions_url: String, timeout_ms: Option<u64>) -> OpenAiGatewayConfig {
    OpenAiGatewayConfig {
        chat_completions_url,
        api_key: "test-openai-key".to_string(),
        model: "test-model".to_string(),
        timeout_ms,
    }
}

fn ok_reply(body: Value) -> MockReply {
    MockReply {
        status: StatusCode::OK,
        body,
        delay_ms: 0,
    }
}

fn success_response_body(model: &str, contents: &[&str]) -> Value {
    let choices = contents
        .iter()
        .enumerate()
        .map(|(index, content)| {
            json!({
                "index": index,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            })
        })
        .collect::<Vec<_>>();

    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "model": model,
        "choices": choices,
        "usage": {
            "prompt_tokens": 12,
            "completion_tokens": 8,
            "total_tokens": 20
        }
    })
}

async fn spawn_test_server(
    state: TestServerState,
) -> (String, oneshot::Sender<()>, tokio::task::JoinHandle<()>) {
    let app = Router::new()
        .route("/v1/chat/completions", post(test_chat_completions_handler))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let local_addr = listener
        .local_addr()
        .expect("listener address should resolve");
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let server_task = tokio::spawn(async move {
        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        });

        server.await.expect("test server should run");
    });

    (
        format!("http://{local_addr}/v1/chat/completions"),
        shutdown_tx,
        server_task,
    )
}

async fn test_chat_completions_handler(
    State(state): State<TestServerState>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.seen_payloads.lock().await.push(payload);

    if let Some(value) = headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
    {
        state.seen_auth_headers.lock().await.push(value.to_string());
    }

    let reply = state.replies.lock().await.pop_front().unwrap_or(MockReply {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: json!({
            "error": {
                "code": "exhausted_test_replies"
            }
        }),
        delay_ms: 0,
    });

    if reply.delay_ms > 0 {
        tokio::time::sleep(std::time::Duration::from_millis(reply.delay_ms)).await;
    }

    (reply.status, Json(reply.body))
}
