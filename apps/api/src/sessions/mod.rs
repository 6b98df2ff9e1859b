//! Practice sessions: the question queue, the append-only result list, and the bounded
//! history of finished sessions.

pub mod handlers;
pub mod locks;
pub mod service;
pub mod store;

use std::collections::HashSet;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::interview::{AnalysisResult, InterviewQuestion, InterviewSession, JobCategory};

/// Refill is triggered once this few unanswered questions are left.
pub const REFILL_THRESHOLD: usize = 3;
pub const MAX_HISTORY: usize = 10;

impl InterviewSession {
    pub fn new(category: JobCategory, custom_category: Option<String>) -> Self {
        Self {
            id: format!("session-{}", Uuid::new_v4()),
            category,
            custom_category,
            results: Vec::new(),
            question_queue: Vec::new(),
            ai_generated: false,
            created_at: Utc::now(),
        }
    }

    fn answered_ids(&self) -> HashSet<&str> {
        self.results.iter().map(|r| r.question_id.as_str()).collect()
    }

    /// Queue entries without a result, in queue order.
    pub fn unanswered(&self) -> Vec<&InterviewQuestion> {
        let answered = self.answered_ids();
        self.question_queue
            .iter()
            .filter(|q| !answered.contains(q.id.as_str()))
            .collect()
    }

    pub fn current_question(&self) -> Option<&InterviewQuestion> {
        self.unanswered().into_iter().next()
    }

    pub fn needs_refill(&self) -> bool {
        self.unanswered().len() <= REFILL_THRESHOLD
    }

    pub fn record_result(&mut self, result: AnalysisResult) {
        self.results.push(result);
    }

    pub fn replace_queue(&mut self, questions: Vec<InterviewQuestion>, ai_generated: bool) {
        self.question_queue = questions;
        self.ai_generated = ai_generated;
    }

    /// Replaces an exhausted queue. Questions answered earlier in this session get a
    /// round suffix on their id, so a bank batch that repeats them is served again
    /// instead of being filtered out as answered.
    pub fn requeue(&mut self, questions: Vec<InterviewQuestion>, ai_generated: bool) {
        let round = self.results.len();
        let answered: HashSet<String> = self
            .answered_ids()
            .into_iter()
            .map(str::to_string)
            .collect();
        let questions = questions
            .into_iter()
            .map(|mut question| {
                if answered.contains(&question.id) {
                    question.id = format!("{}-r{round}", question.id);
                }
                question
            })
            .collect();
        self.replace_queue(questions, ai_generated);
    }

    /// Appends questions not already queued. Returns how many were added.
    pub fn extend_queue(&mut self, questions: Vec<InterviewQuestion>, ai_generated: bool) -> usize {
        let before = self.question_queue.len();
        for question in questions {
            if !self.question_queue.iter().any(|q| q.id == question.id) {
                self.question_queue.push(question);
            }
        }
        self.ai_generated = ai_generated;
        self.question_queue.len() - before
    }
}

/// Finished sessions, most recent first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionHistory(Vec<InterviewSession>);

impl SessionHistory {
    /// Sessions without results are not kept.
    pub fn archive(&mut self, session: InterviewSession) -> bool {
        if session.results.is_empty() {
            return false;
        }
        self.0.insert(0, session);
        self.0.truncate(MAX_HISTORY);
        true
    }

    pub fn sessions(&self) -> &[InterviewSession] {
        &self.0
    }

    pub fn into_sessions(self) -> Vec<InterviewSession> {
        self.0
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::models::interview::{AnalysisScore, Difficulty};

    pub fn question(id: &str) -> InterviewQuestion {
        InterviewQuestion {
            id: id.to_string(),
            category: JobCategory::Backend,
            question: format!("{id}에 대해 설명해주세요."),
            difficulty: Difficulty::Medium,
        }
    }

    pub fn result_for(question_id: &str) -> AnalysisResult {
        AnalysisResult {
            id: AnalysisResult::new_id(),
            question_id: question_id.to_string(),
            answer: "API 응답 시간을 40% 줄였습니다.".to_string(),
            scores: AnalysisScore {
                understanding: 20,
                logic: 18,
                specificity: 15,
                job_fit: 22,
            },
            total_score: 75,
            strengths: vec!["구체적인 수치".to_string()],
            improvements: vec!["배경 설명".to_string()],
            sample_answer: "모범 답변".to_string(),
            detailed_feedback: Some("좋습니다.".to_string()),
            conceptual_explanation: None,
            created_at: Utc::now(),
        }
    }
}
