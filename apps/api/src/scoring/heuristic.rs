//! Heuristic Scorer: local, deterministic rubric scoring from lexical features.
//!
//! Used whenever the remote model is unavailable or fails. Every output is a pure
//! function of the answer text except the sample-answer template, which is drawn from
//! an injected RNG so tests can pin it.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::interview::{AnalysisResult, AnalysisScore, AXIS_MAX};
use crate::scoring::features::{extract_features, Features};
use crate::scoring::keywords::job_title;
use crate::scoring::{AnswerScorer, ScoringError, ScoringInput};

const MAX_FEEDBACK_ITEMS: usize = 3;
const SHORT_ANSWER_WORDS: usize = 20;
const LONG_ANSWER_WORDS: usize = 200;
const SUFFICIENT_LENGTH_WORDS: usize = 50;
const THIN_ANSWER_WORDS: usize = 30;
const MIN_KEYWORD_MATCHES: usize = 2;

/// Local scorer carrying its own seedable RNG.
pub struct HeuristicScorer {
    rng: Mutex<StdRng>,
}

impl HeuristicScorer {
    /// `Some(seed)` pins the template draw; `None` seeds from OS entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }
}

#[async_trait]
impl AnswerScorer for HeuristicScorer {
    async fn score(&self, input: &ScoringInput) -> Result<AnalysisResult, ScoringError> {
        let mut rng = self.rng.lock();
        Ok(score_heuristically(input, &mut *rng))
    }
}

/// Raw axis scores before rounding.
#[derive(Debug, Clone, Copy)]
struct AxisScores {
    understanding: f64,
    logic: f64,
    specificity: f64,
    job_fit: f64,
}

impl AxisScores {
    fn from_features(f: &Features) -> Self {
        let cap = AXIS_MAX as f64;
        let understanding = f.word_count as f64 * 0.3 + f.keyword_matches as f64 * 3.0;
        let logic = f.sentence_count as f64 * 2.0
            + if f.avg_words_per_sentence > 8.0 { 5.0 } else { 0.0 };
        let specificity: f64 = (if f.has_numbers { 8.0 } else { 0.0 })
            + (if f.has_examples { 10.0 } else { 0.0 })
            + (if f.has_timeframe { 7.0 } else { 0.0 });
        let job_fit = f.keyword_matches as f64 * 4.0
            + if f.word_count > SUFFICIENT_LENGTH_WORDS { 5.0 } else { 0.0 };

        let mut scores = Self {
            understanding: understanding.clamp(0.0, cap),
            logic: logic.clamp(0.0, cap),
            specificity: specificity.clamp(0.0, cap),
            job_fit: job_fit.clamp(0.0, cap),
        };
        scores.apply_length_penalty(f.word_count);
        scores
    }

    /// Short answers lose most on specificity; very long ones lose a little on
    /// understanding and logic only.
    fn apply_length_penalty(&mut self, word_count: usize) {
        if word_count < SHORT_ANSWER_WORDS {
            self.understanding *= 0.6;
            self.logic *= 0.6;
            self.specificity *= 0.4;
            self.job_fit *= 0.7;
        }
        if word_count > LONG_ANSWER_WORDS {
            self.understanding *= 0.9;
            self.logic *= 0.8;
        }
    }

    fn total(&self) -> u32 {
        (self.understanding + self.logic + self.specificity + self.job_fit).round() as u32
    }

    fn rounded(&self) -> AnalysisScore {
        AnalysisScore {
            understanding: self.understanding.round() as u32,
            logic: self.logic.round() as u32,
            specificity: self.specificity.round() as u32,
            job_fit: self.job_fit.round() as u32,
        }
    }
}

/// Scores one answer without any remote call.
pub fn score_heuristically<R: Rng + ?Sized>(input: &ScoringInput, rng: &mut R) -> AnalysisResult {
    let custom = input.custom_category.as_deref();
    let features = extract_features(&input.answer, input.category, custom);
    let axes = AxisScores::from_features(&features);

    let strengths = generate_strengths(&input.answer, &features);
    let improvements = generate_improvements(&features);
    let title = job_title(input.category, custom);

    let detailed_feedback = format!(
        "답변의 {}가지 강점이 있으나, {}가지 개선점이 필요합니다. 특히 {}가 중요합니다.",
        strengths.len(),
        improvements.len(),
        improvements[0]
    );
    let conceptual_explanation = format!(
        "이 질문은 {title} 직무의 핵심 역량을 평가하기 위한 것입니다. 실무 경험과 문제 해결 능력을 구체적으로 보여주는 것이 중요합니다."
    );

    AnalysisResult {
        id: AnalysisResult::new_id(),
        question_id: input.question_id.clone(),
        answer: input.answer.clone(),
        scores: axes.rounded(),
        total_score: axes.total(),
        strengths,
        improvements,
        sample_answer: sample_answer(&title, rng),
        detailed_feedback: Some(detailed_feedback),
        conceptual_explanation: Some(conceptual_explanation),
        created_at: Utc::now(),
    }
}

fn generate_strengths(answer: &str, f: &Features) -> Vec<String> {
    let checks = [
        (
            f.word_count >= SUFFICIENT_LENGTH_WORDS,
            "충분한 분량으로 답변을 작성했습니다",
        ),
        (f.has_examples, "구체적인 경험과 예시를 포함했습니다"),
        (
            f.keyword_matches >= MIN_KEYWORD_MATCHES,
            "직무와 관련된 전문 용어를 적절히 사용했습니다",
        ),
        (
            answer.contains("문제") || answer.contains("해결"),
            "문제 해결 능력을 잘 어필했습니다",
        ),
    ];
    collect_feedback(&checks, "질문에 성실하게 답변하려는 의지가 보입니다")
}

fn generate_improvements(f: &Features) -> Vec<String> {
    let checks = [
        (
            f.word_count < THIN_ANSWER_WORDS,
            "답변을 더 구체적이고 자세하게 작성해보세요",
        ),
        (
            !f.has_examples,
            "실제 경험이나 구체적인 예시를 포함하면 더 좋습니다",
        ),
        (
            !f.has_numbers,
            "성과나 결과를 수치로 표현하면 더 설득력이 있습니다",
        ),
        (
            f.keyword_matches < MIN_KEYWORD_MATCHES,
            "해당 직무와 관련된 전문 용어를 더 활용해보세요",
        ),
    ];
    collect_feedback(&checks, "답변의 논리적 구조를 더 명확하게 정리해보세요")
}

/// First three triggered messages in check order, or the fallback when none trigger.
fn collect_feedback(checks: &[(bool, &str)], fallback: &str) -> Vec<String> {
    let mut items: Vec<String> = checks
        .iter()
        .filter(|(triggered, _)| *triggered)
        .take(MAX_FEEDBACK_ITEMS)
        .map(|(_, message)| message.to_string())
        .collect();
    if items.is_empty() {
        items.push(fallback.to_string());
    }
    items
}

fn sample_answer<R: Rng + ?Sized>(job_title: &str, rng: &mut R) -> String {
    let templates = [
        format!(
            "{job_title} 직무에서 이 질문에 대한 이상적인 답변은 구체적인 경험과 성과를 포함하여 논리적으로 구성되어야 합니다. 문제 상황, 해결 과정, 결과를 순서대로 설명하고 배운 점을 언급하는 것이 좋습니다."
        ),
        "효과적인 답변을 위해서는 STAR 기법(Situation, Task, Action, Result)을 활용하여 상황을 설명하고, 본인의 역할과 행동, 그리고 구체적인 성과를 수치와 함께 제시하는 것이 중요합니다.".to_string(),
        format!(
            "이 질문에 대해서는 {job_title} 직무의 핵심 역량을 보여줄 수 있는 실제 사례를 들어 설명하고, 그 과정에서 어떤 어려움이 있었는지, 어떻게 극복했는지를 구체적으로 언급하면 좋습니다."
        ),
    ];
    let index = rng.gen_range(0..templates.len());
    templates[index].clone()
}
