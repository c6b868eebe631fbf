use domain::gateway::open_ai::OpenAiClient;
use domain::normalizer::ClientNameNormalizer;
use domain::scoring::{CriterionEvaluator, RetryPolicy, ScoringOrchestrator};
use domain::transcript::TranscriptDocument;
use domain::warehouse;
use log::{error, info, warn};
use service::{config::Config, logging::Logger};
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config as &Config);

    info!("Starting meeting intel pipeline [{}]...", config.runtime_env);

    let Some(transcripts_dir) = config.transcripts_dir() else {
        error!("No transcripts directory configured; set TRANSCRIPTS_DIR or pass --transcripts-dir");
        std::process::exit(1);
    };

    let Some(api_key) = config.openai_api_key() else {
        error!("No API key configured; set OPENAI_API_KEY");
        std::process::exit(1);
    };

    let db = match service::init_database(&config).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    let service_state = service::AppState::new(config.clone(), &db);

    let provider = match OpenAiClient::new(
        &api_key,
        config.openai_base_url(),
        config.llm_request_timeout_secs,
    ) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("Failed to build completion client: {e}");
            std::process::exit(1);
        }
    };

    match scoring_provider_ok(provider.as_ref()).await {
        Ok(true) => info!("Completion provider credentials verified"),
        Ok(false) => {
            error!("Completion provider rejected the configured API key");
            std::process::exit(1);
        }
        Err(e) => warn!("Could not verify provider credentials, continuing: {e}"),
    }

    let normalizer = ClientNameNormalizer::new();
    normalizer.load(service_state.db_conn_ref()).await;

    let evaluator = CriterionEvaluator::new(
        provider,
        &config.llm_model,
        config.llm_temperature,
        config.llm_max_tokens,
        RetryPolicy::default(),
    );
    let orchestrator = ScoringOrchestrator::new(evaluator, normalizer, config.sequential_criteria);

    let files = match transcript_files(transcripts_dir.as_ref()) {
        Ok(files) => files,
        Err(e) => {
            error!("Failed to read transcripts directory {transcripts_dir}: {e}");
            std::process::exit(1);
        }
    };
    info!(
        "Found {} transcript file(s) in {}",
        files.len(),
        transcripts_dir
    );

    let mut scored = 0u32;
    let mut skipped = 0u32;
    let mut failed = 0u32;

    for path in files {
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Skipping unreadable file {}: {e}", path.display());
                skipped += 1;
                continue;
            }
        };

        let document = match TranscriptDocument::from_json_str(&raw) {
            Ok(document) => document,
            Err(e) => {
                warn!("Skipping {}: {e}", path.display());
                skipped += 1;
                continue;
            }
        };

        let meeting_id = document.meeting_id.clone();
        match orchestrator.score(&document).await {
            Ok(record) => {
                let model = record.into_model(&document);
                match warehouse::upsert(service_state.db_conn_ref(), model).await {
                    Ok(()) => {
                        info!("Scored and stored meeting {meeting_id}");
                        scored += 1;
                    }
                    Err(e) => {
                        error!("Failed to store meeting {meeting_id}: {e}");
                        failed += 1;
                    }
                }
            }
            Err(e) => {
                error!("Failed to score meeting {meeting_id}: {e}");
                failed += 1;
            }
        }
    }

    match warehouse::dedupe(service_state.db_conn_ref()).await {
        Ok(0) => {}
        Ok(removed) => info!("Removed {removed} stale duplicate row(s)"),
        Err(e) => error!("Dedupe pass failed: {e}"),
    }

    info!("Pipeline complete: {scored} scored, {skipped} skipped, {failed} failed");

    if scored == 0 && failed > 0 {
        std::process::exit(1);
    }
}

async fn scoring_provider_ok(
    provider: &OpenAiClient,
) -> Result<bool, scoring_ai::Error> {
    use scoring_ai::Provider as _;
    provider.verify_credentials().await
}

/// JSON files in the transcripts directory, sorted for deterministic runs
fn transcript_files(dir: &str) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    Ok(files)
}
