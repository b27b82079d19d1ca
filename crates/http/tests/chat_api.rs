use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Request, StatusCode};
use mission_chat_core::{ResultSet, Row};
use mission_chat_http::{AppState, create_router};
use mission_chat_llm::{LlmError, TextModel};
use mission_chat_service::{ChatService, ConnectivityCheck, QueryGenerator};
use mission_chat_storage::{InMemorySessionStore, QueryExecutor, StorageError};
use serde_json::{Value, json};
use tower::ServiceExt;

struct EchoSqlModel(&'static str);

#[async_trait]
impl TextModel for EchoSqlModel {
    async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
        Ok(self.0.to_owned())
    }
}

struct Online(bool);

#[async_trait]
impl ConnectivityCheck for Online {
    async fn is_reachable(&self) -> bool {
        self.0
    }
}

/// Three launch sites, whatever the query.
struct FixedLocations;

#[async_trait]
impl QueryExecutor for FixedLocations {
    async fn execute(&self, _sql: &str) -> Result<ResultSet, StorageError> {
        let rows = ["Baikonur Cosmodrome, Kazakhstan", "Plesetsk Cosmodrome, Russia", "Guiana Space Centre, French Guiana"]
            .iter()
            .map(|loc| {
                let mut row = Row::new();
                row.insert("LOCATION".to_owned(), json!(loc));
                row
            })
            .collect();
        Ok(ResultSet::new(vec!["LOCATION".to_owned()], rows))
    }
}

fn app_with(sql: &'static str, online: bool) -> Router {
    let generator = QueryGenerator::new(Arc::new(EchoSqlModel(sql)), Arc::new(Online(online)));
    let chat = ChatService::new(generator, Arc::new(FixedLocations), Arc::new(InMemorySessionStore::new()));
    create_router(Arc::new(AppState {
        chat: Arc::new(chat),
        cors_origins: vec!["http://localhost:3000".to_owned()],
    }))
}

fn app() -> Router {
    app_with("SELECT DISTINCT LOCATION FROM MISSIONS", true)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Option<String>, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let cookie = response
        .headers()
        .get(SET_COOKIE)
        .map(|v| v.to_str().unwrap().split(';').next().unwrap().to_owned());
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, cookie, body)
}

fn get_chat(cookie: &str) -> Request<Body> {
    Request::get("/api/chat").header(COOKIE, cookie).body(Body::empty()).unwrap()
}

fn post_chat(cookie: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::post("/api/chat").header(CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    builder.body(Body::from(body.to_owned())).unwrap()
}

fn delete_chat(cookie: &str) -> Request<Body> {
    Request::delete("/api/chat").header(COOKIE, cookie).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_first_get_issues_cookie_and_empty_history() {
    let app = app();

    let (status, cookie, body) =
        send(&app, Request::get("/api/chat").body(Body::empty()).unwrap()).await;

    assert_eq!(status, StatusCode::OK);
    assert!(cookie.unwrap().starts_with("mission_chat_session="));
    assert_eq!(body, json!({"history": []}));
}

#[tokio::test]
async fn test_post_returns_bot_turn_with_results() {
    let app = app();

    let (status, cookie, body) =
        send(&app, post_chat(None, r#"{"message": "List all unique launch locations."}"#)).await;

    assert_eq!(status, StatusCode::OK);
    let cookie = cookie.unwrap();
    let new = &body["new"];
    assert_eq!(new["role"], "bot");
    assert_eq!(new["columns"], json!(["LOCATION"]));
    assert_eq!(new["rows"].as_array().unwrap().len(), 3);

    let (_, reissued, history) = send(&app, get_chat(&cookie)).await;
    assert!(reissued.is_none());
    let history = history["history"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0], json!({"role": "user", "content": "List all unique launch locations."}));
    assert_eq!(&history[1], new);
}

#[tokio::test]
async fn test_pipeline_failure_is_still_200() {
    let app = app_with("SELECT * FROM MISSIONS", false);

    let (status, _, body) = send(&app, post_chat(None, r#"{"message": "Anything"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["new"],
        json!({
            "role": "bot",
            "content": "You are not connected to the internet right now. Please connect to the internet to proceed."
        })
    );
}

#[tokio::test]
async fn test_empty_or_missing_message_is_422() {
    let app = app();

    for payload in [r#"{"message": ""}"#, r#"{}"#] {
        let (status, _, body) = send(&app, post_chat(None, payload)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "payload {payload}");
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn test_whitespace_message_is_answered() {
    let app = app();

    let (status, cookie, body) = send(&app, post_chat(None, r#"{"message": "   "}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["new"]["role"], "bot");
    let (_, _, history) = send(&app, get_chat(&cookie.unwrap())).await;
    let bots = history["history"].as_array().unwrap().iter().filter(|t| t["role"] == "bot").count();
    assert_eq!(bots, 1);
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let app = app();

    let (status, _, body) = send(&app, post_chat(None, "{not json")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_delete_clears_and_is_idempotent() {
    let app = app();
    let (_, cookie, _) = send(&app, post_chat(None, r#"{"message": "Where do rockets launch?"}"#)).await;
    let cookie = cookie.unwrap();

    let (status, _, body) = send(&app, delete_chat(&cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Chat history cleared successfully.", "cleared": 2}));

    let (_, _, history) = send(&app, get_chat(&cookie)).await;
    assert_eq!(history, json!({"history": []}));

    let (status, _, body) = send(&app, delete_chat(&cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "No chat history to clear.", "cleared": 0}));
}

#[tokio::test]
async fn test_sessions_do_not_share_history() {
    let app = app();
    let (_, alice, _) = send(&app, post_chat(None, r#"{"message": "List all unique launch locations."}"#)).await;
    let (_, bob, _) = send(&app, Request::get("/api/chat").body(Body::empty()).unwrap()).await;

    let alice = alice.unwrap();
    let bob = bob.unwrap();
    assert_ne!(alice, bob);
    let (_, _, history) = send(&app, get_chat(&bob)).await;
    assert_eq!(history, json!({"history": []}));
}

#[tokio::test]
async fn test_health_and_root() {
    let app = app();

    let response = app.clone().oneshot(Request::get("/health").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"ok");

    let (status, _, body) = send(&app, Request::get("/").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Welcome to the Mission Control Chat API!");

    let (_, _, body) = send(&app, Request::get("/api/version").body(Body::empty()).unwrap()).await;
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_cors_preflight_allows_configured_origin_with_credentials() {
    let app = app();
    let request = Request::options("/api/chat")
        .header("origin", "http://localhost:3000")
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "http://localhost:3000");
    assert_eq!(headers["access-control-allow-credentials"], "true");
}
