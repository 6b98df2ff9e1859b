use std::sync::Arc;

use crate::questions::service::QuestionService;
use crate::scoring::orchestrator::ScoringOrchestrator;
use crate::sessions::service::SessionService;
use crate::usage::UsageStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Rate-limit counters. In-memory unless `REDIS_URL` is set.
    pub usage: Arc<dyn UsageStore>,
    pub scoring: Arc<ScoringOrchestrator>,
    pub questions: Arc<QuestionService>,
    pub sessions: SessionService,
}
