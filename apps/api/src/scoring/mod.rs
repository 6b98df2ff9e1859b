// Answer scoring engine.
// Implements: lexical features, heuristic scorer, remote (LLM) scorer adapter, orchestrator.
// All LLM calls go through llm_client; no direct provider calls here.

pub mod features;
pub mod handlers;
pub mod heuristic;
pub mod keywords;
pub mod orchestrator;
pub mod prompts;
pub mod remote;

use async_trait::async_trait;
use thiserror::Error;

use crate::llm_client::{LlmError, ProviderHealth};
use crate::models::interview::{AnalysisResult, JobCategory};

/// Everything a scorer needs to score one answer.
#[derive(Debug, Clone)]
pub struct ScoringInput {
    pub question_id: String,
    pub question: String,
    pub answer: String,
    pub category: JobCategory,
    pub custom_category: Option<String>,
}

/// Failures of a single remote attempt, or of the whole retry loop.
///
/// None of these cross the HTTP boundary; the orchestrator turns them into a fallback.
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("Invalid JSON format in AI response")]
    NoJsonFound,

    #[error("Failed to parse AI response JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid analysis response structure: {0}")]
    Structure(&'static str),

    #[error("Provider error: {0}")]
    Provider(#[from] LlmError),

    #[error("Generated insufficient number of valid questions: {got} < {min}")]
    InsufficientYield { got: usize, min: usize },

    #[error("Remote call failed after {attempts} attempts: {last_error}")]
    Exhausted { attempts: u32, last_error: String },
}

/// A backend that turns one answer into an `AnalysisResult`.
///
/// Carried by the orchestrator as `Arc<dyn AnswerScorer>` so the remote and heuristic
/// paths can be swapped or faked without touching handlers.
#[async_trait]
pub trait AnswerScorer: Send + Sync {
    async fn score(&self, input: &ScoringInput) -> Result<AnalysisResult, ScoringError>;

    /// Whether the backend is worth trying right now. Local backends are always available.
    async fn health(&self) -> ProviderHealth {
        ProviderHealth::available()
    }
}
