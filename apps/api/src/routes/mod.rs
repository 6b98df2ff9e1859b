pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::questions::handlers as questions;
use crate::scoring::handlers as scoring;
use crate::sessions::handlers as sessions;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // AI endpoints
        .route(
            "/api/ai/generate-questions",
            post(questions::handle_generate_questions).get(questions::handle_generate_status),
        )
        .route(
            "/api/ai/analyze-answer",
            post(scoring::handle_analyze_answer).get(scoring::handle_analyze_status),
        )
        // Sessions, keyed by client id
        .route("/api/sessions", post(sessions::handle_start_session))
        .route("/api/sessions/current", get(sessions::handle_current_session))
        .route(
            "/api/sessions/current/answer",
            post(sessions::handle_submit_answer),
        )
        .route(
            "/api/sessions/current/next",
            post(sessions::handle_next_question),
        )
        .route(
            "/api/sessions/current/end",
            post(sessions::handle_end_session),
        )
        .route(
            "/api/sessions/history",
            get(sessions::handle_session_history),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::test_support::ScriptedModel;
    use crate::usage::{MemoryUsageStore, UsageLimits};

    fn test_config(dir: &TempDir) -> Config {
        Config {
            gemini_api_key: None,
            gemini_base_url: "http://127.0.0.1:1".to_string(),
            redis_url: None,
            session_data_dir: dir.path().to_path_buf(),
            port: 0,
            rust_log: "debug".to_string(),
            scoring_seed: Some(5),
            remote_max_retries: 3,
            remote_retry_base: Duration::from_millis(1),
            question_batch_size: 25,
            question_min_yield: 20,
        }
    }

    fn app(model: ScriptedModel) -> (Router, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let usage = Arc::new(MemoryUsageStore::new(UsageLimits::default()));
        let state = crate::build_state(&test_config(&dir), Arc::new(model), usage);
        (build_router(state), dir)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .header("x-forwarded-for", "198.51.100.4")
            .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _dir) = app(ScriptedModel::unhealthy());
        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_analyze_answer_falls_back_to_heuristic() {
        let (app, _dir) = app(ScriptedModel::unhealthy());
        let (status, body) = send(
            &app,
            "POST",
            "/api/ai/analyze-answer",
            Some(json!({
                "questionId": "q-1",
                "question": "React 성능 최적화 경험을 말씀해주세요.",
                "answer": "  React 컴포넌트를 memo로 감싸 렌더링 횟수를 30% 줄였습니다.  ",
                "category": "frontend",
                "customCategory": "무시됨"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["metadata"]["aiGenerated"], false);
        assert_eq!(body["metadata"]["category"], "frontend");
        assert!(body["metadata"].get("customCategory").is_none());
        assert_eq!(
            body["metadata"]["answerLength"],
            "React 컴포넌트를 memo로 감싸 렌더링 횟수를 30% 줄였습니다.".chars().count()
        );
        assert_eq!(body["metadata"]["remaining"]["hourly"], 50);
        assert!(body["analysis"]["totalScore"].as_u64().unwrap() <= 100);
        assert!(body["analysis"]["createdAt"].is_string());
    }

    #[tokio::test]
    async fn test_analyze_answer_validation_is_400() {
        let (app, _dir) = app(ScriptedModel::unhealthy());
        let (status, body) = send(
            &app,
            "POST",
            "/api/ai/analyze-answer",
            Some(json!({
                "questionId": "q-1",
                "question": "질문",
                "answer": "너무 짧음",
                "category": "frontend"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "답변은 최소 10글자 이상 작성해주세요.");
    }

    #[tokio::test]
    async fn test_status_actions() {
        let (app, _dir) = app(ScriptedModel::unhealthy());

        let (status, body) = send(&app, "GET", "/api/ai/analyze-answer?action=health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["health"]["available"], false);

        let (status, body) =
            send(&app, "GET", "/api/ai/generate-questions?action=usage", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rateLimit"]["allowed"], true);
        assert_eq!(body["rateLimit"]["remaining"]["daily"], 50);

        let (status, _) = send(&app, "GET", "/api/ai/analyze-answer?action=bogus", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_generate_questions_from_bank() {
        let (app, _dir) = app(ScriptedModel::unhealthy());
        let (status, body) = send(
            &app,
            "POST",
            "/api/ai/generate-questions",
            Some(json!({ "category": "other", "customCategory": "게임 기획" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["metadata"]["aiGenerated"], false);
        assert_eq!(body["metadata"]["customCategory"], "게임 기획");
        let count = body["questions"].as_array().unwrap().len();
        assert_eq!(body["metadata"]["count"], count);
    }

    #[tokio::test]
    async fn test_session_flow() {
        let (app, _dir) = app(ScriptedModel::unhealthy());

        let (status, _) = send(&app, "GET", "/api/sessions/current", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, started) = send(
            &app,
            "POST",
            "/api/sessions",
            Some(json!({ "category": "backend" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let first_id = started["currentQuestion"]["id"].clone();
        assert!(first_id.is_string());

        let (status, answered) = send(
            &app,
            "POST",
            "/api/sessions/current/answer",
            Some(json!({ "answer": "Redis 캐시를 도입해 API 응답 시간을 40% 단축했습니다." })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(answered["analysis"]["questionId"], first_id);
        assert_eq!(answered["aiGenerated"], false);
        assert_eq!(answered["session"]["results"].as_array().unwrap().len(), 1);

        let (status, next) = send(&app, "POST", "/api/sessions/current/next", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_ne!(next["currentQuestion"]["id"], first_id);

        let (status, _) = send(&app, "POST", "/api/sessions/current/end", None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, history) = send(&app, "GET", "/api/sessions/history", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(history["sessions"].as_array().unwrap().len(), 1);
    }
}
