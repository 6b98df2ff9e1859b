use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Job category a session is practicing for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobCategory {
    Frontend,
    Backend,
    Planner,
    Designer,
    Marketer,
    DataScience,
    Devops,
    ProductManagement,
    Qa,
    MobileDevelopment,
    Other,
}

impl JobCategory {
    pub const ALL: [JobCategory; 11] = [
        JobCategory::Frontend,
        JobCategory::Backend,
        JobCategory::Planner,
        JobCategory::Designer,
        JobCategory::Marketer,
        JobCategory::DataScience,
        JobCategory::Devops,
        JobCategory::ProductManagement,
        JobCategory::Qa,
        JobCategory::MobileDevelopment,
        JobCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobCategory::Frontend => "frontend",
            JobCategory::Backend => "backend",
            JobCategory::Planner => "planner",
            JobCategory::Designer => "designer",
            JobCategory::Marketer => "marketer",
            JobCategory::DataScience => "data-science",
            JobCategory::Devops => "devops",
            JobCategory::ProductManagement => "product-management",
            JobCategory::Qa => "qa",
            JobCategory::MobileDevelopment => "mobile-development",
            JobCategory::Other => "other",
        }
    }
}

impl fmt::Display for JobCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("Unknown job category: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("Unknown difficulty: {other}")),
        }
    }
}

/// A generated interview question. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewQuestion {
    pub id: String,
    pub category: JobCategory,
    pub question: String,
    pub difficulty: Difficulty,
}

/// Four-axis rubric score. Every axis is in [0, 25].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisScore {
    pub understanding: u32,
    pub logic: u32,
    pub specificity: u32,
    pub job_fit: u32,
}

pub const AXIS_MAX: u32 = 25;
pub const TOTAL_MAX: u32 = 100;

/// Scored critique of one submitted answer. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub id: String,
    pub question_id: String,
    pub answer: String,
    pub scores: AnalysisScore,
    pub total_score: u32,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub sample_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_feedback: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conceptual_explanation: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AnalysisResult {
    pub fn new_id() -> String {
        format!("analysis-{}", Uuid::new_v4())
    }
}

/// One practice session for a job category.
///
/// `results` is append-only and chronological; `question_queue` is the backlog the
/// session draws its next question from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewSession {
    pub id: String,
    pub category: JobCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_category: Option<String>,
    pub results: Vec<AnalysisResult>,
    pub question_queue: Vec<InterviewQuestion>,
    pub ai_generated: bool,
    pub created_at: DateTime<Utc>,
}
