mod common;

use std::time::Duration;

use httpmock::Method::POST;
use httpmock::MockServer;
use serde_json::json;

use askbot::config::ClientConfig;
use askbot::error::AskbotError;
use askbot::transport::{AskResponse, AskTransport, HttpAskTransport};

#[tokio::test]
async fn posts_question_as_json_and_parses_answer() {
    let server = MockServer::start_async().await;
    let ask_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/ask")
                .header("content-type", "application/json")
                .json_body(json!({"question": "Where is grid taught?"}));
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"success": true, "response": "Video 84 at 02:15"}));
        })
        .await;

    let transport = common::transport_for(&server);
    let response = transport.ask("Where is grid taught?").await.unwrap();

    assert_eq!(response, AskResponse::answered("Video 84 at 02:15"));
    ask_mock.assert_calls(1);
}

#[tokio::test]
async fn application_error_body_is_not_a_transport_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/ask");
            then.status(200)
                .json_body(json!({"success": false, "error": "Failed to get response from LLM"}));
        })
        .await;

    let response = common::transport_for(&server).ask("hi").await.unwrap();
    assert!(!response.success);
    assert_eq!(
        response.error.as_deref(),
        Some("Failed to get response from LLM")
    );
}

#[tokio::test]
async fn non_success_status_is_an_http_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/ask");
            then.status(500)
                .json_body(json!({"error": "Failed to create embedding"}));
        })
        .await;

    let err = common::transport_for(&server).ask("hi").await.unwrap_err();
    match err {
        AskbotError::Http(message) => {
            assert!(message.contains("500"), "unexpected message: {message}");
            assert!(message.contains("Failed to create embedding"));
        }
        other => panic!("expected http error, got {other}"),
    }
}

#[tokio::test]
async fn undecodable_body_is_a_serialization_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/ask");
            then.status(200).body("<html>oops</html>");
        })
        .await;

    let err = common::transport_for(&server).ask("hi").await.unwrap_err();
    assert!(matches!(err, AskbotError::Serialization(_)), "got {err}");
}

#[tokio::test]
async fn custom_ask_path_is_honored() {
    let server = MockServer::start_async().await;
    let ask_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v2/ask");
            then.status(200).json_body(json!({"success": true, "response": "ok"}));
        })
        .await;

    let config = ClientConfig {
        ask_path: "api/v2/ask".to_string(),
        ..common::config_for(&server)
    };
    let transport = HttpAskTransport::new(&config).unwrap();
    transport.ask("hi").await.unwrap();
    ask_mock.assert_calls(1);
}

#[tokio::test]
async fn configured_timeout_turns_a_slow_backend_into_an_http_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/ask");
            then.status(200)
                .delay(Duration::from_secs(3))
                .json_body(json!({"success": true, "response": "late"}));
        })
        .await;

    let config = ClientConfig {
        timeout_seconds: Some(1),
        ..common::config_for(&server)
    };
    let err = HttpAskTransport::new(&config)
        .unwrap()
        .ask("hi")
        .await
        .unwrap_err();
    assert!(matches!(err, AskbotError::Http(_)), "got {err}");
}

#[tokio::test]
async fn unreachable_backend_is_an_http_error() {
    let config = ClientConfig {
        server_url: "http://127.0.0.1:1".to_string(),
        ..ClientConfig::convention_defaults()
    };
    let err = HttpAskTransport::new(&config)
        .unwrap()
        .ask("hi")
        .await
        .unwrap_err();
    assert!(matches!(err, AskbotError::Http(_)), "got {err}");
}
