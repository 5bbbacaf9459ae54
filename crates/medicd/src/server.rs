//! HTTP server for medicd.

use crate::classifier::Classify;
use crate::config::MedicConfig;
use crate::diagnoser::Diagnoser;
use crate::executor::ExecutorConfig;
use crate::ingest::IncidentLog;
use crate::plan_store::PlanStore;
use crate::routes;
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers
pub struct AppState {
    pub config: MedicConfig,
    pub store: Arc<PlanStore>,
    pub diagnoser: Diagnoser,
    pub client: reqwest::Client,
    pub incident_log: IncidentLog,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: MedicConfig, backend: Arc<dyn Classify>) -> Self {
        let incident_log = IncidentLog::new(&config.log_path);
        Self {
            store: Arc::new(PlanStore::new()),
            diagnoser: Diagnoser::new(backend),
            client: reqwest::Client::new(),
            incident_log,
            start_time: Instant::now(),
            config,
        }
    }

    pub fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig {
            target_base_url: self.config.target_base_url.clone(),
            timeout_secs: self.config.execute_timeout_secs,
        }
    }
}

/// Build the application router.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::webhook_routes())
        .merge(routes::plan_routes())
        .merge(routes::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server.
pub async fn run(state: AppState) -> Result<()> {
    let addr = state.config.listen_addr.clone();
    let app = app(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
