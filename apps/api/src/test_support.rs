//! Test doubles shared by the scoring, question and session tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::llm_client::{LlmError, ProviderHealth, TextGenerator};
use crate::usage::{
    MemoryUsageStore, RateLimitDecision, UsageCount, UsageError, UsageKind, UsageLimits,
    UsageStore,
};

/// A `TextGenerator` that replays canned replies in order, then fails.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<String>>,
    repeat: Option<String>,
    calls: AtomicUsize,
    healthy: bool,
}

impl ScriptedModel {
    pub fn replying(replies: Vec<String>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            repeat: None,
            calls: AtomicUsize::new(0),
            healthy: true,
        }
    }

    /// Answers every call with the same reply.
    pub fn always(reply: impl Into<String>) -> Self {
        Self {
            repeat: Some(reply.into()),
            ..Self::replying(vec![])
        }
    }

    pub fn failing() -> Self {
        Self::replying(vec![])
    }

    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            ..Self::failing()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for ScriptedModel {
    async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reply) = self.replies.lock().pop_front() {
            return Ok(reply);
        }
        self.repeat.clone().ok_or(LlmError::Api {
            status: 503,
            message: "scripted failure".to_string(),
        })
    }

    async fn health(&self) -> ProviderHealth {
        if self.healthy {
            ProviderHealth::available()
        } else {
            ProviderHealth::unavailable("scripted outage")
        }
    }
}

/// In-memory usage store whose `release` always fails, as if Redis dropped the
/// connection after the slot was taken.
pub struct ReleaseFailingUsage {
    inner: MemoryUsageStore,
}

impl ReleaseFailingUsage {
    pub fn new() -> Self {
        Self {
            inner: MemoryUsageStore::new(UsageLimits::default()),
        }
    }
}

#[async_trait]
impl UsageStore for ReleaseFailingUsage {
    fn limits(&self) -> &UsageLimits {
        self.inner.limits()
    }

    async fn usage(&self, client_id: &str, kind: UsageKind) -> Result<UsageCount, UsageError> {
        self.inner.usage(client_id, kind).await
    }

    async fn reserve(
        &self,
        client_id: &str,
        kind: UsageKind,
    ) -> Result<RateLimitDecision, UsageError> {
        self.inner.reserve(client_id, kind).await
    }

    async fn release(&self, _client_id: &str, _kind: UsageKind) -> Result<(), UsageError> {
        Err(redis::RedisError::from((redis::ErrorKind::IoError, "connection reset")).into())
    }
}
