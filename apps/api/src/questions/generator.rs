//! Remote question generation: prompt → generate → extract JSON array → keep valid
//! entries → enforce the minimum yield. Retried as a whole under `RetryPolicy`.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::llm_client::prompts::{fill_template, interviewer_persona, JSON_ONLY_INSTRUCTION};
use crate::llm_client::{extract_json_array, ProviderHealth, TextGenerator};
use crate::models::interview::{Difficulty, InterviewQuestion, JobCategory};
use crate::questions::prompts::QUESTION_PROMPT_TEMPLATE;
use crate::scoring::keywords::job_title;
use crate::scoring::remote::RetryPolicy;
use crate::scoring::ScoringError;

pub struct QuestionGenerator {
    llm: Arc<dyn TextGenerator>,
    retry: RetryPolicy,
    batch_size: usize,
    min_yield: usize,
}

impl QuestionGenerator {
    pub fn new(
        llm: Arc<dyn TextGenerator>,
        retry: RetryPolicy,
        batch_size: usize,
        min_yield: usize,
    ) -> Self {
        Self {
            llm,
            retry,
            batch_size,
            min_yield: min_yield.min(batch_size),
        }
    }

    pub async fn health(&self) -> ProviderHealth {
        self.llm.health().await
    }

    /// A full batch, or an error once every attempt came back short or malformed.
    pub async fn generate(
        &self,
        category: JobCategory,
        custom_category: Option<&str>,
    ) -> Result<Vec<InterviewQuestion>, ScoringError> {
        let prompt = build_question_prompt(category, custom_category, self.batch_size);
        let prompt = prompt.as_str();
        let questions = self
            .retry
            .run("Question generation", || self.attempt(prompt, category))
            .await?;
        debug!("Generated {} questions for {}", questions.len(), category);
        Ok(questions)
    }

    async fn attempt(
        &self,
        prompt: &str,
        category: JobCategory,
    ) -> Result<Vec<InterviewQuestion>, ScoringError> {
        let raw = self.llm.generate(prompt).await?;
        parse_questions(&raw, category, self.batch_size, self.min_yield)
    }
}

/// Difficulty split for a batch: roughly 30% easy, 50% medium, 20% hard.
fn difficulty_mix(count: usize) -> (usize, usize, usize) {
    let easy = (count as f64 * 0.3).round() as usize;
    let hard = (count as f64 * 0.2).round() as usize;
    (easy, count.saturating_sub(easy + hard), hard)
}

pub fn build_question_prompt(
    category: JobCategory,
    custom_category: Option<&str>,
    count: usize,
) -> String {
    let title = job_title(category, custom_category);
    let (easy, medium, hard) = difficulty_mix(count);
    let persona = interviewer_persona(&title);
    let (count, easy, medium, hard) = (
        count.to_string(),
        easy.to_string(),
        medium.to_string(),
        hard.to_string(),
    );
    fill_template(
        QUESTION_PROMPT_TEMPLATE,
        &[
            ("persona", persona.as_str()),
            ("count", count.as_str()),
            ("easy", easy.as_str()),
            ("medium", medium.as_str()),
            ("hard", hard.as_str()),
            ("category", category.as_str()),
            ("json_only", JSON_ONLY_INSTRUCTION),
        ],
    )
}

/// Keeps entries with a non-empty `question` and a recognised `difficulty`; the batch's
/// category always wins over whatever the model echoed back.
pub fn parse_questions(
    raw: &str,
    category: JobCategory,
    batch_size: usize,
    min_yield: usize,
) -> Result<Vec<InterviewQuestion>, ScoringError> {
    let json = extract_json_array(raw).ok_or(ScoringError::NoJsonFound)?;
    let entries: Vec<Value> = serde_json::from_str(json)?;

    let questions: Vec<InterviewQuestion> = entries
        .iter()
        .filter_map(|entry| {
            let question = entry.get("question")?.as_str()?.trim();
            if question.is_empty() {
                return None;
            }
            let difficulty: Difficulty = entry.get("difficulty")?.as_str()?.parse().ok()?;
            Some(InterviewQuestion {
                id: format!("ai-{}", Uuid::new_v4()),
                category,
                question: question.to_string(),
                difficulty,
            })
        })
        .take(batch_size)
        .collect();

    if questions.len() < min_yield {
        return Err(ScoringError::InsufficientYield {
            got: questions.len(),
            min: min_yield,
        });
    }
    Ok(questions)
}
