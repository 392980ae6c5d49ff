//! HTTP-level tests for the backend adapters
//!
//! These use wiremock to stand in for the Ollama and OpenAI endpoints, so
//! the adapters are exercised over a real socket without a real model.

use exponat::{Analyzer, AnalyzerConfig, BackendKind, NO_RESPONSE};
use serde_json::json;
use wiremock::matchers::{any, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn local_config(server: &MockServer) -> AnalyzerConfig {
    let mut config = AnalyzerConfig::default();
    config.backend = BackendKind::Local;
    config.ollama.host = server.uri();
    config.ollama.model = "llava".to_string();
    config
}

fn hosted_config(server: &MockServer) -> AnalyzerConfig {
    let mut config = AnalyzerConfig::default();
    config.backend = BackendKind::Hosted;
    config.openai.base_url = server.uri();
    config.openai.model = "gpt-4o-mini".to_string();
    config.openai.api_key = Some("test-key".to_string());
    config
}

#[tokio::test]
async fn empty_image_set_makes_no_network_call() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let analyzer = Analyzer::new(&local_config(&server)).unwrap();
    let result = analyzer.analyze(&[], None).await;

    assert!(!result.succeeded);
    assert_eq!(result.error_detail.as_deref(), Some("no images supplied"));
    // expect(0) is verified when the server drops
}

#[tokio::test]
async fn ollama_error_status_and_body_are_preserved() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(500).set_body_string("server error"))
        .mount(&server)
        .await;

    let analyzer = Analyzer::new(&local_config(&server)).unwrap();
    let result = analyzer.analyze(&[vec![1, 2, 3]], None).await;

    assert!(!result.succeeded);
    let detail = result.error_detail.unwrap();
    assert!(detail.contains("500"), "missing status in: {detail}");
    assert!(detail.contains("server error"), "missing body in: {detail}");
}

#[tokio::test]
async fn ollama_stream_is_reassembled() {
    let server = MockServer::start().await;
    let body = concat!(
        "{\"response\":\"Hel\"}\n",
        "{\"response\":\"lo\"}\n",
        "{\"done\":true}\n",
    );
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({"model": "llava", "stream": true})))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(body, "application/x-ndjson"),
        )
        .mount(&server)
        .await;

    let analyzer = Analyzer::new(&local_config(&server)).unwrap();
    let result = analyzer.analyze(&[vec![0xFF, 0xD8, 0xFF]], None).await;

    assert!(result.succeeded, "{:?}", result.error_detail);
    assert_eq!(result.text, "Hello");
}

#[tokio::test]
async fn ollama_stream_survives_a_corrupt_line() {
    let server = MockServer::start().await;
    let body = concat!(
        "{\"response\":\"Steel \"}\n",
        "{\"response\":\"ga\n", // truncated object
        "{\"response\":\"gear.\"}\n",
        "{\"done\":true}\n",
    );
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(body, "application/x-ndjson"),
        )
        .mount(&server)
        .await;

    let analyzer = Analyzer::new(&local_config(&server)).unwrap();
    let result = analyzer.analyze(&[vec![1]], None).await;

    assert!(result.succeeded);
    assert_eq!(result.text, "Steel gear.");
}

#[tokio::test]
async fn ollama_stream_with_no_text_yields_sentinel() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("{\"done\":true}\n", "application/x-ndjson"),
        )
        .mount(&server)
        .await;

    let analyzer = Analyzer::new(&local_config(&server)).unwrap();
    let result = analyzer.analyze(&[vec![1]], None).await;

    assert!(result.succeeded);
    assert_eq!(result.text, NO_RESPONSE);
}

#[tokio::test]
async fn hosted_backend_returns_exact_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "model": "gpt-4o-mini",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": "Object: lever, metal, marked 'No. 4'."
                },
                "finish_reason": "stop"
            }]
        })))
        .mount(&server)
        .await;

    let analyzer = Analyzer::new(&hosted_config(&server)).unwrap();
    let result = analyzer.analyze(&[vec![0x89, b'P', b'N', b'G']], None).await;

    assert!(result.succeeded, "{:?}", result.error_detail);
    assert_eq!(result.text, "Object: lever, metal, marked 'No. 4'.");
}

#[tokio::test]
async fn hosted_request_carries_prompt_and_data_uri() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"model": "gpt-4o-mini"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "ok"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let analyzer = Analyzer::new(&hosted_config(&server)).unwrap();
    let result = analyzer.analyze(&[vec![0x89, b'P', b'N', b'G']], None).await;
    assert!(result.succeeded);

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1]["role"], "user");
    let parts = body["messages"][1]["content"].as_array().unwrap();
    assert_eq!(parts[0]["type"], "text");
    assert_eq!(parts[1]["type"], "image_url");
    let url = parts[1]["image_url"]["url"].as_str().unwrap();
    assert!(url.starts_with("data:image/png;base64,"));
}

#[tokio::test]
async fn hosted_error_status_and_body_are_preserved() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let analyzer = Analyzer::new(&hosted_config(&server)).unwrap();
    let result = analyzer.analyze(&[vec![1]], None).await;

    assert!(!result.succeeded);
    let detail = result.error_detail.unwrap();
    assert!(detail.contains("429"));
    assert!(detail.contains("rate limited"));
}

#[tokio::test]
async fn connection_failure_becomes_a_failed_result() {
    // Reserve a port, then shut the server down so the connection is refused.
    // A pooled server from `MockServer::start()` keeps listening after drop,
    // so build an unpooled one that actually releases the socket.
    let server = MockServer::builder().start().await;
    let config = local_config(&server);
    drop(server);

    let analyzer = Analyzer::new(&config).unwrap();
    let result = analyzer.analyze(&[vec![1]], None).await;

    assert!(!result.succeeded);
    assert!(result.error_detail.unwrap().contains("network error"));
}
