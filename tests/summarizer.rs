use channelmind::llm::LlmClient;
use channelmind::summarize::{ContextItem, LlmSummarizer, Summarizer, DISABLED_MESSAGE};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn context() -> Vec<ContextItem> {
    vec![ContextItem {
        channel: "travel".to_string(),
        author: "anna".to_string(),
        timestamp: "2024-05-01 10:00:00".to_string(),
        content: "Portugal im Mai ist super".to_string(),
        links: Vec::new(),
    }]
}

fn completion_body(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "created": 1714557600,
        "model": "test-model",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

#[tokio::test]
async fn test_summarizer_returns_model_answer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Portugal im Mai.")))
        .expect(2)
        .mount(&server)
        .await;

    let client = LlmClient::new(&server.uri(), "test-key", "test-model");
    let summarizer = LlmSummarizer::new(client, Duration::from_millis(50));

    let started = std::time::Instant::now();
    assert_eq!(summarizer.summarize("portugal", &context()).await, "Portugal im Mai.");
    assert_eq!(summarizer.summarize("portugal", &context()).await, "Portugal im Mai.");
    assert!(started.elapsed() >= Duration::from_millis(50));
}

#[tokio::test]
async fn test_summarizer_maps_auth_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {
                "message": "Incorrect API key provided",
                "type": "invalid_request_error",
                "param": null,
                "code": "invalid_api_key"
            }
        })))
        .mount(&server)
        .await;

    let client = LlmClient::new(&server.uri(), "wrong", "test-model");
    let answer = LlmSummarizer::new(client, Duration::ZERO)
        .summarize("portugal", &context())
        .await;
    assert!(answer.contains("API-Schlüssel"), "{answer}");
}

#[tokio::test]
async fn test_disabled_summarizer() {
    let summarizer = LlmSummarizer::disabled();
    assert!(!summarizer.is_enabled());
    assert_eq!(summarizer.summarize("x", &context()).await, DISABLED_MESSAGE);
}
