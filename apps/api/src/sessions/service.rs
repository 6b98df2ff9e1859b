//! Session lifecycle on top of the question service, the scoring orchestrator and the
//! session store.
//!
//! Every read-modify-write of an owner's session runs under that owner's lock, so a
//! background refill never overwrites a result recorded in the meantime.

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::interview::{InterviewQuestion, InterviewSession, JobCategory};
use crate::questions::service::QuestionService;
use crate::scoring::orchestrator::{AnalyzeOutcome, AnalyzeRequest, ScoringOrchestrator};
use crate::sessions::locks::OwnerLocks;
use crate::sessions::store::SessionStore;

/// Questions drawn from the bank when a session cannot get a remote batch.
const SESSION_FALLBACK_SIZE: usize = 10;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session: InterviewSession,
    pub current_question: Option<InterviewQuestion>,
}

impl From<InterviewSession> for SessionView {
    fn from(session: InterviewSession) -> Self {
        let current_question = session.current_question().cloned();
        Self {
            session,
            current_question,
        }
    }
}

#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn SessionStore>,
    questions: Arc<QuestionService>,
    scoring: Arc<ScoringOrchestrator>,
    locks: OwnerLocks,
}

impl SessionService {
    pub fn new(
        store: Arc<dyn SessionStore>,
        questions: Arc<QuestionService>,
        scoring: Arc<ScoringOrchestrator>,
    ) -> Self {
        Self {
            store,
            questions,
            scoring,
            locks: OwnerLocks::default(),
        }
    }

    async fn require_current(&self, owner: &str) -> Result<InterviewSession, AppError> {
        self.store
            .load_current(owner)
            .await?
            .ok_or_else(|| AppError::NotFound("진행 중인 면접 세션이 없습니다.".to_string()))
    }

    /// Remote batch when allowed, bank otherwise. Never fails: a rate-limited or failing
    /// generator still leaves the session with questions.
    async fn fetch_questions(
        &self,
        owner: &str,
        category: JobCategory,
        custom_category: Option<&str>,
    ) -> (Vec<InterviewQuestion>, bool) {
        match self
            .questions
            .generate_for(owner, category, custom_category)
            .await
        {
            Ok(batch) => (batch.questions, batch.ai_generated),
            Err(e) => {
                warn!("Question supply for session failed, using question bank: {e}");
                (
                    self.questions.fallback(category, SESSION_FALLBACK_SIZE),
                    false,
                )
            }
        }
    }

    /// Starts a fresh session. A previous session with results is archived first.
    pub async fn start(
        &self,
        owner: &str,
        category: JobCategory,
        custom_category: Option<String>,
    ) -> Result<SessionView, AppError> {
        let _guard = self.locks.acquire(owner).await;

        if let Some(previous) = self.store.load_current(owner).await? {
            self.store.archive(owner, previous).await?;
        }

        let mut session = InterviewSession::new(category, custom_category);
        let (questions, ai_generated) = self
            .fetch_questions(owner, category, session.custom_category.as_deref())
            .await;
        session.replace_queue(questions, ai_generated);
        self.store.save_current(owner, &session).await?;

        info!(
            "Started session {} for {} with {} questions",
            session.id,
            category,
            session.question_queue.len()
        );
        Ok(session.into())
    }

    pub async fn current(&self, owner: &str) -> Result<SessionView, AppError> {
        Ok(self.require_current(owner).await?.into())
    }

    /// Scores `answer` against the current question and appends the result.
    pub async fn submit_answer(
        &self,
        owner: &str,
        answer: String,
    ) -> Result<(AnalyzeOutcome, SessionView), AppError> {
        let _guard = self.locks.acquire(owner).await;

        let mut session = self.require_current(owner).await?;
        let question = session
            .current_question()
            .cloned()
            .ok_or_else(|| AppError::Validation("답변할 질문이 없습니다. 다음 질문으로 이동해주세요.".to_string()))?;

        let request = AnalyzeRequest {
            question_id: Some(question.id),
            question: Some(question.question),
            answer: Some(answer),
            category: Some(session.category.as_str().to_string()),
            custom_category: session.custom_category.clone(),
        };
        let outcome = self.scoring.analyze_submission(request, owner).await?;

        session.record_result(outcome.analysis.clone());
        self.store.save_current(owner, &session).await?;
        Ok((outcome, session.into()))
    }

    /// Moves to the next unanswered question.
    pub async fn advance(&self, owner: &str) -> Result<SessionView, AppError> {
        let (view, _refill) = self.advance_with_refill(owner).await?;
        Ok(view)
    }

    /// Like `advance`, also returning the background refill task when one was spawned.
    pub(crate) async fn advance_with_refill(
        &self,
        owner: &str,
    ) -> Result<(SessionView, Option<JoinHandle<()>>), AppError> {
        let _guard = self.locks.acquire(owner).await;

        let mut session = self.require_current(owner).await?;

        if session.current_question().is_none() {
            info!("Session {} has no unanswered questions, fetching a new batch", session.id);
            let (questions, ai_generated) = self
                .fetch_questions(owner, session.category, session.custom_category.as_deref())
                .await;
            session.requeue(questions, ai_generated);
            self.store.save_current(owner, &session).await?;
            return Ok((session.into(), None));
        }

        let refill = session
            .needs_refill()
            .then(|| self.spawn_refill(owner, &session));
        Ok((session.into(), refill))
    }

    fn spawn_refill(&self, owner: &str, session: &InterviewSession) -> JoinHandle<()> {
        let service = self.clone();
        let owner = owner.to_string();
        let session_id = session.id.clone();
        let category = session.category;
        let custom_category = session.custom_category.clone();

        tokio::spawn(async move {
            let (questions, ai_generated) = service
                .fetch_questions(&owner, category, custom_category.as_deref())
                .await;
            if let Err(e) = service
                .apply_refill(&owner, &session_id, questions, ai_generated)
                .await
            {
                warn!("Failed to refill question queue for session {session_id}: {e}");
            }
        })
    }

    async fn apply_refill(
        &self,
        owner: &str,
        session_id: &str,
        questions: Vec<InterviewQuestion>,
        ai_generated: bool,
    ) -> Result<(), AppError> {
        let _guard = self.locks.acquire(owner).await;

        let Some(mut session) = self.store.load_current(owner).await? else {
            return Ok(());
        };
        // the session may have ended while the batch was being generated
        if session.id != session_id {
            return Ok(());
        }
        let added = session.extend_queue(questions, ai_generated);
        self.store.save_current(owner, &session).await?;
        info!("Refilled session {session_id} with {added} questions");
        Ok(())
    }

    /// Archives the session when it has results, then clears it.
    pub async fn end(&self, owner: &str) -> Result<SessionView, AppError> {
        let _guard = self.locks.acquire(owner).await;

        let session = self.require_current(owner).await?;
        self.store.archive(owner, session.clone()).await?;
        self.store.clear_current(owner).await?;
        Ok(session.into())
    }

    pub async fn history(&self, owner: &str) -> Result<Vec<InterviewSession>, AppError> {
        Ok(self.store.load_history(owner).await?.into_sessions())
    }
}
