//! Scoring Orchestrator. Validates a submission, applies the rate limit, then scores it
//! remotely when the provider is healthy and locally otherwise.
//!
//! Remote failures never reach the caller: they are logged and the heuristic scorer takes
//! over. Usage is only recorded when the remote path produced the result.

use std::sync::Arc;

use anyhow::anyhow;
use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::interview::{AnalysisResult, JobCategory};
use crate::scoring::{AnswerScorer, ScoringInput};
use crate::usage::{UsageCount, UsageKind, UsageStore};

pub const MIN_ANSWER_CHARS: usize = 10;
pub const MAX_ANSWER_CHARS: usize = 2000;

/// Body of `POST /api/ai/analyze-answer`. Fields are optional so a missing one surfaces
/// as a validation error rather than a deserialization rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub question_id: Option<String>,
    pub question: Option<String>,
    pub answer: Option<String>,
    pub category: Option<String>,
    pub custom_category: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AnalyzeOutcome {
    pub analysis: AnalysisResult,
    pub ai_generated: bool,
    pub category: JobCategory,
    pub custom_category: Option<String>,
    pub answer_length: usize,
    pub remaining: Option<UsageCount>,
}

pub struct ScoringOrchestrator {
    remote: Arc<dyn AnswerScorer>,
    heuristic: Arc<dyn AnswerScorer>,
    usage: Arc<dyn UsageStore>,
}

impl ScoringOrchestrator {
    pub fn new(
        remote: Arc<dyn AnswerScorer>,
        heuristic: Arc<dyn AnswerScorer>,
        usage: Arc<dyn UsageStore>,
    ) -> Self {
        Self {
            remote,
            heuristic,
            usage,
        }
    }

    pub fn remote(&self) -> &Arc<dyn AnswerScorer> {
        &self.remote
    }

    /// Pre-checks short-circuit in order: missing fields, too short, too long, unknown
    /// category, rate limit. The rate-limit step reserves a slot, handed back unless the
    /// remote path produced the result.
    pub async fn analyze_submission(
        &self,
        request: AnalyzeRequest,
        client_id: &str,
    ) -> Result<AnalyzeOutcome, AppError> {
        let input = validate(request)?;
        let answer_length = input.answer.chars().count();

        let decision = self
            .usage
            .reserve(client_id, UsageKind::AnswerAnalysis)
            .await?;
        if !decision.allowed {
            return Err(AppError::RateLimited {
                message: decision.message.unwrap_or_default(),
                remaining: decision.remaining,
            });
        }

        let scored = self.score(&input).await;
        if !matches!(scored, Ok((_, true))) {
            self.release_slot(client_id).await;
        }
        let (analysis, ai_generated) = scored?;

        Ok(AnalyzeOutcome {
            analysis,
            ai_generated,
            category: input.category,
            custom_category: input.custom_category,
            answer_length,
            remaining: decision.remaining,
        })
    }

    /// Only remote analyses count against the quota. A failed release costs the client
    /// one slot, which is not worth failing a scored answer over.
    async fn release_slot(&self, client_id: &str) {
        if let Err(e) = self
            .usage
            .release(client_id, UsageKind::AnswerAnalysis)
            .await
        {
            warn!("Failed to release analysis quota for {client_id}: {e}");
        }
    }

    /// Scores without validation or rate limiting. Returns the result and whether the
    /// remote path produced it.
    pub async fn score(&self, input: &ScoringInput) -> Result<(AnalysisResult, bool), AppError> {
        let health = self.remote.health().await;
        if health.available {
            match self.remote.score(input).await {
                Ok(analysis) => {
                    info!(
                        "Remote analysis completed for question {} ({} chars)",
                        input.question_id,
                        input.answer.chars().count()
                    );
                    return Ok((analysis, true));
                }
                Err(e) => warn!("Remote analysis failed, using heuristic scorer: {e}"),
            }
        } else {
            warn!(
                "Remote scorer unavailable ({}), using heuristic scorer",
                health.error.as_deref().unwrap_or("unknown")
            );
        }

        let analysis = self
            .heuristic
            .score(input)
            .await
            .map_err(|e| AppError::Internal(anyhow!("Heuristic scoring failed: {e}")))?;
        Ok((analysis, false))
    }
}

fn required(field: Option<String>) -> Option<String> {
    field.filter(|v| !v.trim().is_empty())
}

fn validate(request: AnalyzeRequest) -> Result<ScoringInput, AppError> {
    let (Some(question_id), Some(question), Some(answer), Some(category)) = (
        required(request.question_id),
        required(request.question),
        required(request.answer),
        required(request.category),
    ) else {
        return Err(AppError::Validation(
            "필수 필드가 누락되었습니다.".to_string(),
        ));
    };

    let answer = answer.trim().to_string();
    let length = answer.chars().count();
    if length < MIN_ANSWER_CHARS {
        return Err(AppError::Validation(format!(
            "답변은 최소 {MIN_ANSWER_CHARS}글자 이상 작성해주세요."
        )));
    }
    if length > MAX_ANSWER_CHARS {
        return Err(AppError::Validation(format!(
            "답변은 {MAX_ANSWER_CHARS}글자를 초과할 수 없습니다."
        )));
    }

    let category: JobCategory = category
        .trim()
        .parse()
        .map_err(|_| AppError::Validation("지원하지 않는 직무 카테고리입니다.".to_string()))?;
    let custom_category = match category {
        JobCategory::Other => required(request.custom_category).map(|c| c.trim().to_string()),
        _ => None,
    };

    Ok(ScoringInput {
        question_id,
        question,
        answer,
        category,
        custom_category,
    })
}
