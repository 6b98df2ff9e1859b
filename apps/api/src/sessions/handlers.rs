use axum::{extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::interview::{AnalysisResult, InterviewSession};
use crate::questions::handlers::parse_category;
use crate::sessions::service::SessionView;
use crate::state::AppState;
use crate::usage::{client_id, UsageCount};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    pub category: Option<String>,
    pub custom_category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    pub answer: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerResponse {
    pub success: bool,
    pub analysis: AnalysisResult,
    pub ai_generated: bool,
    pub remaining: Option<UsageCount>,
    #[serde(flatten)]
    pub view: SessionView,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub success: bool,
    #[serde(flatten)]
    pub view: SessionView,
}

impl From<SessionView> for SessionResponse {
    fn from(view: SessionView) -> Self {
        Self {
            success: true,
            view,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub sessions: Vec<InterviewSession>,
}

/// POST /api/sessions
pub async fn handle_start_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<StartSessionRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let (category, custom_category) =
        parse_category(req.category.as_deref(), req.custom_category.as_deref())?;
    let view = state
        .sessions
        .start(&client_id(&headers), category, custom_category)
        .await?;
    Ok(Json(view.into()))
}

/// GET /api/sessions/current
pub async fn handle_current_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SessionResponse>, AppError> {
    let view = state.sessions.current(&client_id(&headers)).await?;
    Ok(Json(view.into()))
}

/// POST /api/sessions/current/answer
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SubmitAnswerRequest>,
) -> Result<Json<SubmitAnswerResponse>, AppError> {
    let (outcome, view) = state
        .sessions
        .submit_answer(&client_id(&headers), req.answer.unwrap_or_default())
        .await?;
    Ok(Json(SubmitAnswerResponse {
        success: true,
        analysis: outcome.analysis,
        ai_generated: outcome.ai_generated,
        remaining: outcome.remaining,
        view,
    }))
}

/// POST /api/sessions/current/next
pub async fn handle_next_question(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SessionResponse>, AppError> {
    let view = state.sessions.advance(&client_id(&headers)).await?;
    Ok(Json(view.into()))
}

/// POST /api/sessions/current/end
pub async fn handle_end_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SessionResponse>, AppError> {
    let view = state.sessions.end(&client_id(&headers)).await?;
    Ok(Json(view.into()))
}

/// GET /api/sessions/history
pub async fn handle_session_history(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<HistoryResponse>, AppError> {
    let sessions = state.sessions.history(&client_id(&headers)).await?;
    Ok(Json(HistoryResponse {
        success: true,
        sessions,
    }))
}
