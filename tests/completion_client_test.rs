mod common;

use chat_relay::core::prompts;
use chat_relay::domain::ports::Completion;
use chat_relay::{CompletionClient, RelayError};
use httpmock::prelude::*;
use std::time::Duration;

fn client(server: &MockServer, extra: &[(&str, &str)]) -> CompletionClient {
    let config = common::config_for(&server.base_url(), extra);
    CompletionClient::from_config(&config.completion).unwrap()
}

#[tokio::test]
async fn enhance_request_carries_system_prompt_and_headers() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/messages")
                .header("x-api-key", "sk-test")
                .header("anthropic-version", "2023-06-01")
                .json_body(serde_json::json!({
                    "model": "test-model",
                    "max_tokens": 4096,
                    "messages": [
                        {"role": "user", "content": "Enhance this prompt:\n\nadd dark mode"}
                    ],
                    "system": prompts::ENHANCE_SYSTEM_PROMPT
                }));
            then.status(200).json_body(serde_json::json!({
                "id": "msg_1",
                "type": "message",
                "content": [
                    {"type": "text", "text": "Add a dark theme toggle."},
                    {"type": "text", "text": "Persist the choice."}
                ]
            }));
        })
        .await;

    let text = client(&server, &[("ZAI_MODEL", "test-model")])
        .complete(prompts::enhance_request("add dark mode"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(text, "Add a dark theme toggle.\nPersist the choice.");
}

#[tokio::test]
async fn non_success_status_is_an_api_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/messages");
            then.status(529).body("overloaded");
        })
        .await;

    let err = client(&server, &[])
        .complete(prompts::ask_request("hello"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "AI API error (529): overloaded");
}

#[tokio::test]
async fn slow_upstream_times_out_after_one_attempt() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/messages");
            then.status(200)
                .delay(Duration::from_millis(800))
                .json_body(serde_json::json!({"content": []}));
        })
        .await;

    let err = client(&server, &[])
        .with_timeout(Duration::from_millis(100))
        .complete(prompts::ask_request("hello"))
        .await
        .unwrap_err();

    assert!(err.is_timeout(), "expected timeout, got {err:?}");
    tokio::time::sleep(Duration::from_millis(900)).await;
    assert_eq!(mock.hits_async().await, 1);
}

#[tokio::test]
async fn missing_key_fails_without_a_request() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/messages");
            then.status(200);
        })
        .await;

    let mut config = common::config_for(&server.base_url(), &[]);
    config.completion.api_key = None;
    let client = CompletionClient::from_config(&config.completion).unwrap();

    let err = client
        .complete(prompts::ask_request("hello"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RelayError::NotConfigured {
            setting: "ZAI_API_KEY"
        }
    ));
    assert_eq!(mock.hits_async().await, 0);
}
