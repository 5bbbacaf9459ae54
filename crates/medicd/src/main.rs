//! Medic Daemon - autonomous incident-response loop.
//!
//! Watches a service's logs, classifies failures, proposes a
//! remediation plan, gates it behind human approval, and executes
//! the approved action against the target service.

use anyhow::Result;
use medicd::classifier::{Classify, OllamaClassifier, PatternClassifier};
use medicd::config::{ClassifierBackend, MedicConfig};
use medicd::server::{self, AppState};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Medic Daemon v{} starting", env!("CARGO_PKG_VERSION"));

    let config = MedicConfig::load();

    let backend: Arc<dyn Classify> = match config.classifier_backend {
        ClassifierBackend::Pattern => {
            info!("Using deterministic pattern classifier");
            Arc::new(PatternClassifier)
        }
        ClassifierBackend::Ollama => {
            info!("Using Ollama classifier ({})", config.ollama_model);
            Arc::new(OllamaClassifier::new(
                &config.ollama_url,
                &config.ollama_model,
                config.classify_timeout_secs,
            ))
        }
    };

    info!(
        "Monitoring {} (logs at {})",
        config.target_service, config.log_path
    );

    server::run(AppState::new(config, backend)).await
}
