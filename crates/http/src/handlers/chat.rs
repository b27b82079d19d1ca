use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;

use crate::AppState;
use crate::api_error::ApiError;
use crate::api_types::{ChatRequest, ClearResponse, HistoryResponse, NewMessageResponse};
use crate::session::SessionId;

pub async fn get_history(
    State(state): State<Arc<AppState>>,
    session: SessionId,
) -> Result<(SessionId, Json<HistoryResponse>), ApiError> {
    let history = state.chat.history(session.as_str()).await?;
    Ok((session, Json(HistoryResponse { history })))
}

/// Always 200 with a bot turn once the body is valid; pipeline failures are
/// reported in the turn's content.
pub async fn post_message(
    State(state): State<Arc<AppState>>,
    session: SessionId,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<(SessionId, Json<NewMessageResponse>), ApiError> {
    let Json(req) = payload?;
    if req.message.is_empty() {
        return Err(ApiError::UnprocessableEntity("message must not be empty".to_owned()));
    }
    let new = state.chat.handle_message(session.as_str(), &req.message).await?;
    Ok((session, Json(NewMessageResponse { new })))
}

pub async fn clear_history(
    State(state): State<Arc<AppState>>,
    session: SessionId,
) -> Result<(SessionId, Json<ClearResponse>), ApiError> {
    let cleared = state.chat.clear(session.as_str()).await?;
    let message = if cleared == 0 {
        "No chat history to clear."
    } else {
        "Chat history cleared successfully."
    };
    Ok((session, Json(ClearResponse { message, cleared })))
}
