use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::ProviderHealth;
use crate::models::interview::{InterviewQuestion, JobCategory};
use crate::questions::bank;
use crate::questions::generator::QuestionGenerator;
use crate::usage::{UsageCount, UsageKind, UsageStore};

#[derive(Debug, Clone)]
pub struct QuestionBatch {
    pub questions: Vec<InterviewQuestion>,
    pub ai_generated: bool,
    pub remaining: Option<UsageCount>,
}

/// Rate-limited question supply: remote batch when the provider is healthy, the built-in
/// bank otherwise. Only remote batches keep their reserved quota slot.
pub struct QuestionService {
    generator: QuestionGenerator,
    usage: Arc<dyn UsageStore>,
    rng: Mutex<StdRng>,
    batch_size: usize,
}

impl QuestionService {
    pub fn new(
        generator: QuestionGenerator,
        usage: Arc<dyn UsageStore>,
        batch_size: usize,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            generator,
            usage,
            rng: Mutex::new(rng),
            batch_size,
        }
    }

    pub async fn health(&self) -> ProviderHealth {
        self.generator.health().await
    }

    pub async fn generate_for(
        &self,
        client_id: &str,
        category: JobCategory,
        custom_category: Option<&str>,
    ) -> Result<QuestionBatch, AppError> {
        let decision = self
            .usage
            .reserve(client_id, UsageKind::QuestionGeneration)
            .await?;
        if !decision.allowed {
            return Err(AppError::RateLimited {
                message: decision.message.unwrap_or_default(),
                remaining: decision.remaining,
            });
        }

        let health = self.generator.health().await;
        if health.available {
            match self.generator.generate(category, custom_category).await {
                Ok(questions) => {
                    info!("Generated {} remote questions for {}", questions.len(), category);
                    return Ok(QuestionBatch {
                        questions,
                        ai_generated: true,
                        remaining: decision.remaining,
                    });
                }
                Err(e) => warn!("Question generation failed, using question bank: {e}"),
            }
        } else {
            warn!(
                "Question generator unavailable ({}), using question bank",
                health.error.as_deref().unwrap_or("unknown")
            );
        }

        if let Err(e) = self
            .usage
            .release(client_id, UsageKind::QuestionGeneration)
            .await
        {
            warn!("Failed to release question quota for {client_id}: {e}");
        }
        Ok(QuestionBatch {
            questions: self.fallback(category, self.batch_size),
            ai_generated: false,
            remaining: decision.remaining,
        })
    }

    /// Up to `n` shuffled bank questions.
    pub fn fallback(&self, category: JobCategory, n: usize) -> Vec<InterviewQuestion> {
        let mut rng = self.rng.lock();
        bank::draw(category, n, &mut *rng)
    }
}
