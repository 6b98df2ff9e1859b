use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::models::interview::{AnalysisResult, JobCategory};
use crate::scoring::orchestrator::AnalyzeRequest;
use crate::state::AppState;
use crate::usage::{client_id, UsageCount, UsageKind};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeMetadata {
    pub ai_generated: bool,
    pub category: JobCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_category: Option<String>,
    pub answer_length: usize,
    pub remaining: Option<UsageCount>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub analysis: AnalysisResult,
    pub metadata: AnalyzeMetadata,
}

#[derive(Debug, Deserialize)]
pub struct ActionQuery {
    pub action: Option<String>,
}

/// POST /api/ai/analyze-answer
pub async fn handle_analyze_answer(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let client = client_id(&headers);
    let outcome = state.scoring.analyze_submission(req, &client).await?;

    Ok(Json(AnalyzeResponse {
        success: true,
        analysis: outcome.analysis,
        metadata: AnalyzeMetadata {
            ai_generated: outcome.ai_generated,
            category: outcome.category,
            custom_category: outcome.custom_category,
            answer_length: outcome.answer_length,
            remaining: outcome.remaining,
        },
    }))
}

/// GET /api/ai/analyze-answer?action=health|usage
pub async fn handle_analyze_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ActionQuery>,
) -> Result<Json<Value>, AppError> {
    match query.action.as_deref() {
        Some("health") => {
            let health = state.scoring.remote().health().await;
            Ok(Json(json!({
                "success": true,
                "health": health,
                "timestamp": Utc::now(),
            })))
        }
        Some("usage") => {
            let decision = state
                .usage
                .check(&client_id(&headers), UsageKind::AnswerAnalysis)
                .await?;
            Ok(Json(json!({
                "success": true,
                "rateLimit": decision,
            })))
        }
        _ => Err(AppError::Validation("Invalid action".to_string())),
    }
}
