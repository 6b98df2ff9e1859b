//! Per-client usage tracking and rate limiting.
//!
//! Counters are kept per client id and per `UsageKind`, with independent hourly and
//! daily windows. The store is injected (`Arc<dyn UsageStore>`): in-memory for a single
//! process, Redis when several instances share limits.

pub mod memory;
pub mod redis_store;

use async_trait::async_trait;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use memory::MemoryUsageStore;
pub use redis_store::RedisUsageStore;

const UNKNOWN_CLIENT: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UsageKind {
    QuestionGeneration,
    AnswerAnalysis,
}

impl UsageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UsageKind::QuestionGeneration => "question_generation",
            UsageKind::AnswerAnalysis => "answer_analysis",
        }
    }
}

/// Allowed calls per window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageLimit {
    pub daily: u32,
    pub hourly: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageLimits {
    pub question_generation: UsageLimit,
    pub answer_analysis: UsageLimit,
}

impl Default for UsageLimits {
    fn default() -> Self {
        Self {
            question_generation: UsageLimit {
                daily: 50,
                hourly: 20,
            },
            answer_analysis: UsageLimit {
                daily: 100,
                hourly: 50,
            },
        }
    }
}

impl UsageLimits {
    pub fn for_kind(&self, kind: UsageKind) -> UsageLimit {
        match kind {
            UsageKind::QuestionGeneration => self.question_generation,
            UsageKind::AnswerAnalysis => self.answer_analysis,
        }
    }
}

/// Calls made (or, in a decision, calls left) in the current windows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageCount {
    pub daily: u32,
    pub hourly: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateLimitDecision {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<UsageCount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RateLimitDecision {
    /// Hourly limit is checked before the daily one. Remaining quota is reported either way.
    pub fn evaluate(usage: UsageCount, limit: UsageLimit) -> Self {
        let remaining = Some(UsageCount {
            daily: limit.daily.saturating_sub(usage.daily),
            hourly: limit.hourly.saturating_sub(usage.hourly),
        });

        let message = if usage.hourly >= limit.hourly {
            Some(format!(
                "시간당 {}회 제한을 초과했습니다. 잠시 후 다시 시도해주세요.",
                limit.hourly
            ))
        } else if usage.daily >= limit.daily {
            Some(format!(
                "일일 {}회 제한을 초과했습니다. 내일 다시 시도해주세요.",
                limit.daily
            ))
        } else {
            None
        };

        Self {
            allowed: message.is_none(),
            remaining,
            message,
        }
    }
}

#[derive(Debug, Error)]
pub enum UsageError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

/// Storage for rate-limit counters. Implementations own their own atomicity.
///
/// A remote call takes a slot with `reserve` before it starts, so concurrent requests
/// cannot all pass the limit at once. Calls that end up served locally hand the slot
/// back with `release`.
#[async_trait]
pub trait UsageStore: Send + Sync {
    fn limits(&self) -> &UsageLimits;

    /// Current counts, after expiring any elapsed window.
    async fn usage(&self, client_id: &str, kind: UsageKind) -> Result<UsageCount, UsageError>;

    /// Checks the limit and, when allowed, counts the call against both windows in the
    /// same step. `remaining` is reported as it was before this call.
    async fn reserve(
        &self,
        client_id: &str,
        kind: UsageKind,
    ) -> Result<RateLimitDecision, UsageError>;

    /// Undoes one `reserve`. Counts never go below zero.
    async fn release(&self, client_id: &str, kind: UsageKind) -> Result<(), UsageError>;

    /// Read-only decision, nothing is counted.
    async fn check(
        &self,
        client_id: &str,
        kind: UsageKind,
    ) -> Result<RateLimitDecision, UsageError> {
        let usage = self.usage(client_id, kind).await?;
        Ok(RateLimitDecision::evaluate(
            usage,
            self.limits().for_kind(kind),
        ))
    }
}

/// Identifies the caller: first `x-forwarded-for` hop, then `x-real-ip`, else "unknown".
pub fn client_id(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    let real_ip = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    forwarded
        .or(real_ip)
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_client_id_prefers_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(client_id(&headers), "203.0.113.7");
    }

    #[test]
    fn test_client_id_falls_back_to_real_ip_then_unknown() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(client_id(&headers), "10.0.0.2");
        assert_eq!(client_id(&HeaderMap::new()), "unknown");
    }

    #[test]
    fn test_evaluate_reports_remaining() {
        let decision = RateLimitDecision::evaluate(
            UsageCount {
                daily: 10,
                hourly: 4,
            },
            UsageLimit {
                daily: 100,
                hourly: 50,
            },
        );
        assert!(decision.allowed);
        assert_eq!(
            decision.remaining,
            Some(UsageCount {
                daily: 90,
                hourly: 46
            })
        );
    }

    #[test]
    fn test_evaluate_checks_hourly_before_daily() {
        let limit = UsageLimit {
            daily: 10,
            hourly: 5,
        };
        let both = RateLimitDecision::evaluate(UsageCount { daily: 10, hourly: 5 }, limit);
        assert!(!both.allowed);
        assert!(both.message.unwrap().starts_with("시간당 5회"));

        let daily = RateLimitDecision::evaluate(UsageCount { daily: 10, hourly: 1 }, limit);
        assert!(!daily.allowed);
        assert!(daily.message.unwrap().starts_with("일일 10회"));
    }
}
