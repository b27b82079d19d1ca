//! Request and response bodies.

use mission_chat_core::ChatTurn;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub history: Vec<ChatTurn>,
}

#[derive(Debug, Serialize)]
pub struct NewMessageResponse {
    pub new: ChatTurn,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub message: &'static str,
    pub cleared: usize,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
}
