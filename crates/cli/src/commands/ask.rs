use std::sync::Arc;

use anyhow::Result;
use mission_chat_core::AppConfig;
use mission_chat_storage::InMemorySessionStore;
use uuid::Uuid;

use super::build_chat_service;

pub(crate) async fn run(question: &str) -> Result<()> {
    let config = AppConfig::from_env()?;
    let chat = build_chat_service(&config, Arc::new(InMemorySessionStore::new()))?;

    let session_id = Uuid::new_v4().to_string();
    let turn = chat.handle_message(&session_id, question).await?;
    println!("{}", serde_json::to_string_pretty(&turn)?);
    Ok(())
}
