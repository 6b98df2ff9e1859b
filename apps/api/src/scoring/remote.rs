//! Remote Scorer Adapter. Scores an answer through the LLM and validates its reply.
//!
//! Flow: build prompt → generate → extract JSON region → validate structure →
//!       clamp and map into `AnalysisResult`. Any failure is retried under `RetryPolicy`;
//!       results are all-or-nothing per call.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tracing::{debug, warn};

use crate::llm_client::prompts::{fill_template, interviewer_persona, JSON_ONLY_INSTRUCTION};
use crate::llm_client::{extract_json_object, ProviderHealth, TextGenerator};
use crate::models::interview::{AnalysisResult, AnalysisScore, AXIS_MAX, TOTAL_MAX};
use crate::scoring::keywords::job_title;
use crate::scoring::prompts::ANALYSIS_PROMPT_TEMPLATE;
use crate::scoring::{AnswerScorer, ScoringError, ScoringInput};

const MAX_FEEDBACK_ITEMS: usize = 3;
const STRENGTHS_FALLBACK: &str = "AI 분석 결과를 정상적으로 받지 못했습니다.";
const IMPROVEMENTS_FALLBACK: &str = "다시 시도해주세요.";
const SAMPLE_ANSWER_FALLBACK: &str = "모범 답변을 생성할 수 없습니다.";

// ────────────────────────────────────────────────────────────────────────────
// Retry policy
// ────────────────────────────────────────────────────────────────────────────

/// Bounded retry with exponential backoff: after a failed attempt `n` (0-based) the
/// caller sleeps `base_delay * 2^n` before the next one, up to `max_retries` retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based): 1s, 2s, 4s with the defaults.
    pub fn delay_before(&self, retry: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(retry.saturating_sub(1))
    }

    /// Runs `attempt` until it succeeds or the retries are used up.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut attempt: F) -> Result<T, ScoringError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ScoringError>>,
    {
        let mut last_error: Option<ScoringError> = None;

        for retry in 0..=self.max_retries {
            if retry > 0 {
                let delay = self.delay_before(retry);
                warn!(
                    "{} attempt {} failed, retrying after {}ms...",
                    operation,
                    retry,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            match attempt().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!("{} attempt {} error: {}", operation, retry + 1, e);
                    last_error = Some(e);
                }
            }
        }

        Err(ScoringError::Exhausted {
            attempts: self.max_retries + 1,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "Unknown error occurred".to_string()),
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// RemoteScorer
// ────────────────────────────────────────────────────────────────────────────

/// Scores answers through the remote model. Holds no per-request state.
pub struct RemoteScorer {
    llm: Arc<dyn TextGenerator>,
    retry: RetryPolicy,
}

impl RemoteScorer {
    pub fn new(llm: Arc<dyn TextGenerator>, retry: RetryPolicy) -> Self {
        Self { llm, retry }
    }

    async fn attempt(&self, prompt: &str, input: &ScoringInput) -> Result<AnalysisResult, ScoringError> {
        let raw = self.llm.generate(prompt).await?;
        parse_analysis(&raw, input)
    }
}

#[async_trait]
impl AnswerScorer for RemoteScorer {
    async fn score(&self, input: &ScoringInput) -> Result<AnalysisResult, ScoringError> {
        let prompt = build_analysis_prompt(input);
        let prompt = prompt.as_str();
        let result = self
            .retry
            .run("Answer analysis", || self.attempt(prompt, input))
            .await?;
        debug!(
            "Remote analysis for question {}: total={}",
            input.question_id, result.total_score
        );
        Ok(result)
    }

    async fn health(&self) -> ProviderHealth {
        self.llm.health().await
    }
}

/// Fills the analysis template for one submission.
pub fn build_analysis_prompt(input: &ScoringInput) -> String {
    let title = job_title(input.category, input.custom_category.as_deref());
    let persona = interviewer_persona(&title);
    fill_template(
        ANALYSIS_PROMPT_TEMPLATE,
        &[
            ("persona", persona.as_str()),
            ("job_title", title.as_str()),
            ("json_only", JSON_ONLY_INSTRUCTION),
            ("question", input.question.as_str()),
            ("answer", input.answer.as_str()),
        ],
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Reply parsing and validation
// ────────────────────────────────────────────────────────────────────────────

/// Validates a raw model reply and maps it onto `AnalysisResult`.
///
/// Fails fast, in order: no JSON region, unparseable JSON, missing `scores` object,
/// non-numeric `totalScore`, missing `feedback`. Axis scores are clamped to [0, 25]
/// and `totalScore` to [0, 100] independently; the total is not recomputed.
pub fn parse_analysis(raw: &str, input: &ScoringInput) -> Result<AnalysisResult, ScoringError> {
    let json = extract_json_object(raw).ok_or(ScoringError::NoJsonFound)?;
    let value: Value = serde_json::from_str(json)?;

    let scores = value
        .get("scores")
        .filter(|s| s.is_object())
        .ok_or(ScoringError::Structure("missing scores"))?;
    let total_score = value
        .get("totalScore")
        .and_then(Value::as_f64)
        .ok_or(ScoringError::Structure("invalid totalScore"))?;
    let feedback = value
        .get("feedback")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .ok_or(ScoringError::Structure("missing feedback"))?;

    Ok(AnalysisResult {
        id: AnalysisResult::new_id(),
        question_id: input.question_id.clone(),
        answer: input.answer.clone(),
        scores: AnalysisScore {
            understanding: axis(scores, "understanding"),
            logic: axis(scores, "logic"),
            specificity: axis(scores, "specificity"),
            job_fit: axis(scores, "relevance"),
        },
        total_score: clamp_score(total_score, TOTAL_MAX),
        strengths: feedback_items(value.get("strengths"), STRENGTHS_FALLBACK),
        improvements: feedback_items(value.get("improvements"), IMPROVEMENTS_FALLBACK),
        sample_answer: non_empty_str(&value, "idealAnswer")
            .unwrap_or(SAMPLE_ANSWER_FALLBACK)
            .to_string(),
        detailed_feedback: Some(feedback.to_string()),
        conceptual_explanation: non_empty_str(&value, "conceptualExplanation").map(str::to_string),
        created_at: Utc::now(),
    })
}

/// Missing or non-numeric axes count as zero.
fn axis(scores: &Value, key: &str) -> u32 {
    clamp_score(scores.get(key).and_then(Value::as_f64).unwrap_or(0.0), AXIS_MAX)
}

fn clamp_score(value: f64, max: u32) -> u32 {
    value.round().clamp(0.0, max as f64) as u32
}

fn feedback_items(value: Option<&Value>, fallback: &str) -> Vec<String> {
    let items: Vec<String> = value
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .take(MAX_FEEDBACK_ITEMS)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    if items.is_empty() {
        vec![fallback.to_string()]
    } else {
        items
    }
}

fn non_empty_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
