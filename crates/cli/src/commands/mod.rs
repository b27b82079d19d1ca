pub(crate) mod ask;
pub(crate) mod load;
pub(crate) mod serve;

use std::sync::Arc;

use anyhow::Result;
use mission_chat_core::{AppConfig, MISSIONS_SCHEMA};
use mission_chat_llm::LlmClient;
use mission_chat_service::{
    ChatService, ConnectivityCheck, QueryGenerator, SkipConnectivityCheck, TcpConnectivityCheck,
};
use mission_chat_storage::{MissionDataset, SessionStore};

/// Wires the pipeline from startup configuration.
pub(crate) fn build_chat_service(
    config: &AppConfig,
    sessions: Arc<dyn SessionStore>,
) -> Result<ChatService> {
    let llm = LlmClient::from_config(&config.llm)?;
    tracing::info!(model = llm.model(), base_url = llm.base_url(), "LLM client configured");

    let connectivity: Arc<dyn ConnectivityCheck> = if config.skip_connectivity_check {
        tracing::info!("Connectivity probe disabled");
        Arc::new(SkipConnectivityCheck)
    } else {
        Arc::new(TcpConnectivityCheck::new(config.probe_addr.clone(), config.probe_timeout))
    };

    let dataset = MissionDataset::new(config.database_path.clone(), config.query_timeout);
    check_dataset(&dataset);

    let generator = QueryGenerator::new(Arc::new(llm), connectivity);
    Ok(ChatService::new(generator, Arc::new(dataset), sessions)
        .with_record_user_turns(config.record_user_turns))
}

/// Warns about a missing or incomplete dataset; queries will then report
/// execution errors rather than the server refusing to start.
fn check_dataset(dataset: &MissionDataset) {
    match dataset.inspect(&MISSIONS_SCHEMA) {
        Ok(report) if report.is_complete() => {
            tracing::info!(
                path = %dataset.path().display(),
                rows = report.row_count,
                "Dataset ready"
            );
        },
        Ok(report) if !report.table_exists => {
            tracing::warn!(
                path = %dataset.path().display(),
                "Table {} not found; run `mission-chat load <csv>` first",
                MISSIONS_SCHEMA.table
            );
        },
        Ok(report) => {
            tracing::warn!(
                path = %dataset.path().display(),
                missing = ?report.missing_columns,
                "Dataset is missing expected columns"
            );
        },
        Err(e) => {
            tracing::warn!(path = %dataset.path().display(), error = %e, "Dataset unavailable");
        },
    }
}
