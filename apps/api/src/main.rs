mod config;
mod errors;
mod llm_client;
mod models;
mod questions;
mod routes;
mod scoring;
mod sessions;
mod state;
#[cfg(test)]
mod test_support;
mod usage;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::{LlmClient, TextGenerator};
use crate::questions::generator::QuestionGenerator;
use crate::questions::service::QuestionService;
use crate::routes::build_router;
use crate::scoring::heuristic::HeuristicScorer;
use crate::scoring::orchestrator::ScoringOrchestrator;
use crate::scoring::remote::{RemoteScorer, RetryPolicy};
use crate::sessions::service::SessionService;
use crate::sessions::store::JsonFileSessionStore;
use crate::state::AppState;
use crate::usage::{MemoryUsageStore, RedisUsageStore, UsageLimits, UsageStore};

const USAGE_CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Interview API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::new(config.gemini_api_key.clone(), &config.gemini_base_url)?;
    if config.gemini_api_key.is_some() {
        info!("LLM client initialized (model: {})", llm_client::MODEL);
    } else {
        warn!("GEMINI_API_KEY not set; questions and analysis will use local fallbacks");
    }

    let usage = build_usage_store(&config).await?;
    let state = build_state(&config, Arc::new(llm), usage);
    info!("Session data directory: {}", config.session_data_dir.display());

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Redis when `REDIS_URL` is set, otherwise process memory with an hourly sweep of idle
/// clients.
async fn build_usage_store(config: &Config) -> Result<Arc<dyn UsageStore>> {
    let limits = UsageLimits::default();
    let store: Arc<dyn UsageStore> = match &config.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.as_str())?;
            Arc::new(RedisUsageStore::connect(&client, limits).await?)
        }
        None => {
            let store = Arc::new(MemoryUsageStore::new(limits));
            spawn_usage_cleanup(store.clone());
            info!("Using in-memory usage store");
            store
        }
    };
    Ok(store)
}

fn spawn_usage_cleanup(store: Arc<MemoryUsageStore>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(USAGE_CLEANUP_INTERVAL);
        loop {
            ticker.tick().await;
            let removed = store.cleanup_stale();
            debug!(
                "Usage cleanup removed {removed} clients, {} still tracked",
                store.tracked_clients()
            );
        }
    });
}

/// Wires the services around one provider client and one usage store.
fn build_state(config: &Config, llm: Arc<dyn TextGenerator>, usage: Arc<dyn UsageStore>) -> AppState {
    let retry = RetryPolicy {
        max_retries: config.remote_max_retries,
        base_delay: config.remote_retry_base,
    };

    let scoring = Arc::new(ScoringOrchestrator::new(
        Arc::new(RemoteScorer::new(llm.clone(), retry)),
        Arc::new(HeuristicScorer::new(config.scoring_seed)),
        usage.clone(),
    ));
    let questions = Arc::new(QuestionService::new(
        QuestionGenerator::new(
            llm,
            retry,
            config.question_batch_size,
            config.question_min_yield,
        ),
        usage.clone(),
        config.question_batch_size,
        config.scoring_seed,
    ));
    let sessions = SessionService::new(
        Arc::new(JsonFileSessionStore::new(&config.session_data_dir)),
        questions.clone(),
        scoring.clone(),
    );

    AppState {
        usage,
        scoring,
        questions,
        sessions,
    }
}
