use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::models::interview::{InterviewQuestion, JobCategory};
use crate::scoring::handlers::ActionQuery;
use crate::state::AppState;
use crate::usage::{client_id, UsageCount, UsageKind};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuestionsRequest {
    pub category: Option<String>,
    pub custom_category: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuestionsMetadata {
    pub ai_generated: bool,
    pub category: JobCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_category: Option<String>,
    pub count: usize,
    pub remaining: Option<UsageCount>,
}

#[derive(Debug, Serialize)]
pub struct GenerateQuestionsResponse {
    pub success: bool,
    pub questions: Vec<InterviewQuestion>,
    pub metadata: GenerateQuestionsMetadata,
}

/// Parses the category field shared by question and session requests. `customCategory`
/// is only kept for `other`.
pub fn parse_category(
    category: Option<&str>,
    custom_category: Option<&str>,
) -> Result<(JobCategory, Option<String>), AppError> {
    let category = category
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::Validation("Category is required".to_string()))?;
    let category: JobCategory = category
        .parse()
        .map_err(|_| AppError::Validation("지원하지 않는 직무 카테고리입니다.".to_string()))?;
    let custom_category = match category {
        JobCategory::Other => custom_category
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string),
        _ => None,
    };
    Ok((category, custom_category))
}

/// POST /api/ai/generate-questions
pub async fn handle_generate_questions(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<GenerateQuestionsRequest>,
) -> Result<Json<GenerateQuestionsResponse>, AppError> {
    let (category, custom_category) =
        parse_category(req.category.as_deref(), req.custom_category.as_deref())?;

    let batch = state
        .questions
        .generate_for(&client_id(&headers), category, custom_category.as_deref())
        .await?;

    Ok(Json(GenerateQuestionsResponse {
        success: true,
        metadata: GenerateQuestionsMetadata {
            ai_generated: batch.ai_generated,
            category,
            custom_category,
            count: batch.questions.len(),
            remaining: batch.remaining,
        },
        questions: batch.questions,
    }))
}

/// GET /api/ai/generate-questions?action=health|usage
pub async fn handle_generate_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ActionQuery>,
) -> Result<Json<Value>, AppError> {
    match query.action.as_deref() {
        Some("health") => Ok(Json(json!({
            "success": true,
            "health": state.questions.health().await,
            "timestamp": Utc::now(),
        }))),
        Some("usage") => {
            let decision = state
                .usage
                .check(&client_id(&headers), UsageKind::QuestionGeneration)
                .await?;
            Ok(Json(json!({
                "success": true,
                "rateLimit": decision,
            })))
        }
        _ => Err(AppError::Validation("Invalid action parameter".to_string())),
    }
}
