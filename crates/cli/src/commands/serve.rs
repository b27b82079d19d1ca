use std::sync::Arc;

use anyhow::Result;
use mission_chat_core::AppConfig;
use mission_chat_http::{AppState, create_router};
use mission_chat_storage::SessionBackend;

use super::build_chat_service;

pub(crate) async fn run(port: u16, host: String) -> Result<()> {
    let config = AppConfig::from_env()?;
    let sessions = Arc::new(SessionBackend::from_path(config.session_db_path.as_deref())?);
    let chat = Arc::new(build_chat_service(&config, sessions)?);

    let state = Arc::new(AppState { chat, cors_origins: config.cors_origins.clone() });
    let router = create_router(state);

    let addr = format!("{host}:{port}");
    tracing::info!("Starting HTTP server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
