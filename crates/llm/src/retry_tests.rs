use crate::client::LlmClient;
use crate::error::LlmError;
use crate::model::TextModel;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "choices": [{
            "message": {
                "content": content,
                "role": "assistant"
            }
        }]
    })
}

fn client_for(server: &MockServer) -> LlmClient {
    LlmClient::new("test-key".to_owned(), server.uri()).unwrap().with_model("test-model".to_owned())
}

#[tokio::test]
async fn test_success_on_first_attempt() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer test-key"))
        .and(body_partial_json(serde_json::json!({
            "model": "test-model",
            "temperature": 0.0,
            "messages": [{"role": "user", "content": "List Indian missions"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            "SELECT * FROM MISSIONS WHERE LOCATION LIKE '%INDIA%'",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let result = client.generate("List Indian missions").await.unwrap();
    assert_eq!(result, "SELECT * FROM MISSIONS WHERE LOCATION LIKE '%INDIA%'");
}

#[tokio::test]
async fn test_retry_on_429_then_success() {
    let server = MockServer::start().await;
    let client = client_for(&server).with_max_retries(1);

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("success after retry")))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Rate limit exceeded"))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;

    let result = client.generate("hello").await.unwrap();
    assert_eq!(result, "success after retry");
}

#[tokio::test]
async fn test_no_retry_by_default() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client.generate("hello").await.unwrap_err();
    assert!(matches!(err, LlmError::Status { code: 503, .. }));
}

#[tokio::test]
async fn test_no_retry_on_401() {
    let server = MockServer::start().await;
    let client = client_for(&server).with_max_retries(3);

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .expect(1)
        .mount(&server)
        .await;

    let err_msg = client.generate("hello").await.unwrap_err().to_string();
    assert!(err_msg.contains("401"));
    assert!(err_msg.contains("Unauthorized"));
}

#[tokio::test]
async fn test_all_retries_exhausted() {
    let server = MockServer::start().await;
    let client = client_for(&server).with_max_retries(1);

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .expect(2)
        .mount(&server)
        .await;

    let err = client.generate("hello").await.unwrap_err();
    assert!(matches!(err, LlmError::Exhausted { attempts: 2, .. }));
    let err_msg = err.to_string();
    assert!(err_msg.contains("503"));
    assert!(err_msg.contains("Service Unavailable"));
}

#[tokio::test]
async fn test_empty_choices_is_an_error() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
        .mount(&server)
        .await;

    let err = client.generate("hello").await.unwrap_err();
    assert!(matches!(err, LlmError::NoChoices));
}

#[tokio::test]
async fn test_null_content_reports_finish_reason() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": null}, "finish_reason": "content_filter"}]
        })))
        .mount(&server)
        .await;

    let err = client.generate("hello").await.unwrap_err();
    match err {
        LlmError::NoText { finish_reason } => assert_eq!(finish_reason, "content_filter"),
        other => panic!("expected NoText, got {other:?}"),
    }
}

#[tokio::test]
async fn test_html_body_is_decode_error() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let err = client.generate("hello").await.unwrap_err();
    assert!(matches!(err, LlmError::Decode { .. }));
    assert!(err.to_string().contains("gateway"));
}
