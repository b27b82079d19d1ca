//! HTTP API server for mission-chat.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(unreachable_pub, reason = "pub items are re-exported")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::missing_docs_in_private_items, reason = "Internal crate")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::exhaustive_structs, reason = "HTTP types are stable")]
#![allow(clippy::single_call_fn, reason = "Helper functions improve readability")]

pub mod api_error;
mod api_types;
mod handlers;
mod session;

use std::sync::Arc;

use axum::Json;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use mission_chat_service::ChatService;
use tower_http::cors::{AllowOrigin, CorsLayer};

pub use api_types::{
    ChatRequest, ClearResponse, HistoryResponse, MessageResponse, NewMessageResponse,
    VersionResponse,
};
pub use session::SessionId;

/// Shared application state for all HTTP handlers.
pub struct AppState {
    pub chat: Arc<ChatService>,
    /// Browser origins allowed to call the API with credentials.
    pub cors_origins: Vec<String>,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.cors_origins);
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/version", get(version))
        .route(
            "/api/chat",
            get(handlers::chat::get_history)
                .post(handlers::chat::post_message)
                .delete(handlers::chat::clear_history),
        )
        .layer(cors)
        .with_state(state)
}

/// Credentialed CORS for an explicit origin list. Unparseable origins are skipped.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            },
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
}

async fn root() -> Json<MessageResponse> {
    Json(MessageResponse { message: "Welcome to the Mission Control Chat API!" })
}

async fn health() -> &'static str {
    "ok"
}

async fn version() -> Json<VersionResponse> {
    Json(VersionResponse { version: env!("CARGO_PKG_VERSION") })
}
