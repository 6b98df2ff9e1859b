use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::debug;

use super::{RateLimitDecision, UsageCount, UsageError, UsageKind, UsageLimits, UsageStore};

const HOUR: Duration = Duration::from_secs(60 * 60);
const DAY: Duration = Duration::from_secs(24 * 60 * 60);
/// Clients idle longer than this are dropped by `cleanup_stale`.
const STALE_AFTER: Duration = Duration::from_secs(2 * 24 * 60 * 60);

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    started: Instant,
}

impl Window {
    fn new(now: Instant) -> Self {
        Self {
            count: 0,
            started: now,
        }
    }

    fn refresh(&mut self, now: Instant, length: Duration) {
        if now.duration_since(self.started) > length {
            self.count = 0;
            self.started = now;
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Counter {
    hourly: Window,
    daily: Window,
}

impl Counter {
    fn new(now: Instant) -> Self {
        Self {
            hourly: Window::new(now),
            daily: Window::new(now),
        }
    }

    fn refresh(&mut self, now: Instant) -> UsageCount {
        self.hourly.refresh(now, HOUR);
        self.daily.refresh(now, DAY);
        UsageCount {
            daily: self.daily.count,
            hourly: self.hourly.count,
        }
    }
}

#[derive(Debug)]
struct ClientUsage {
    counters: HashMap<UsageKind, Counter>,
    last_seen: Instant,
}

impl ClientUsage {
    fn counter(&mut self, kind: UsageKind, now: Instant) -> &mut Counter {
        self.last_seen = now;
        self.counters.entry(kind).or_insert_with(|| Counter::new(now))
    }
}

/// Process-local usage store. Windows start at a client's first call and reset once
/// they have fully elapsed.
pub struct MemoryUsageStore {
    limits: UsageLimits,
    clients: Mutex<HashMap<String, ClientUsage>>,
}

impl MemoryUsageStore {
    pub fn new(limits: UsageLimits) -> Self {
        Self {
            limits,
            clients: Mutex::new(HashMap::new()),
        }
    }

    fn with_counter<T>(&self, client_id: &str, kind: UsageKind, f: impl FnOnce(&mut Counter, Instant) -> T) -> T {
        let now = Instant::now();
        let mut clients = self.clients.lock();
        let client = clients
            .entry(client_id.to_string())
            .or_insert_with(|| ClientUsage {
                counters: HashMap::new(),
                last_seen: now,
            });
        f(client.counter(kind, now), now)
    }

    /// Drops clients not seen for two days. Returns how many were removed.
    pub fn cleanup_stale(&self) -> usize {
        let now = Instant::now();
        let mut clients = self.clients.lock();
        let before = clients.len();
        clients.retain(|_, usage| now.duration_since(usage.last_seen) <= STALE_AFTER);
        let removed = before - clients.len();
        if removed > 0 {
            debug!("Dropped {removed} stale usage records");
        }
        removed
    }

    pub fn tracked_clients(&self) -> usize {
        self.clients.lock().len()
    }
}

#[async_trait]
impl UsageStore for MemoryUsageStore {
    fn limits(&self) -> &UsageLimits {
        &self.limits
    }

    async fn usage(&self, client_id: &str, kind: UsageKind) -> Result<UsageCount, UsageError> {
        Ok(self.with_counter(client_id, kind, |counter, now| counter.refresh(now)))
    }

    async fn reserve(
        &self,
        client_id: &str,
        kind: UsageKind,
    ) -> Result<RateLimitDecision, UsageError> {
        let limit = self.limits.for_kind(kind);
        Ok(self.with_counter(client_id, kind, |counter, now| {
            let decision = RateLimitDecision::evaluate(counter.refresh(now), limit);
            if decision.allowed {
                counter.hourly.count += 1;
                counter.daily.count += 1;
            }
            decision
        }))
    }

    async fn release(&self, client_id: &str, kind: UsageKind) -> Result<(), UsageError> {
        self.with_counter(client_id, kind, |counter, now| {
            counter.refresh(now);
            counter.hourly.count = counter.hourly.count.saturating_sub(1);
            counter.daily.count = counter.daily.count.saturating_sub(1);
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usage::UsageLimit;

    fn small_limits() -> UsageLimits {
        UsageLimits {
            question_generation: UsageLimit {
                daily: 5,
                hourly: 2,
            },
            answer_analysis: UsageLimit {
                daily: 3,
                hourly: 2,
            },
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_client_has_full_quota() {
        let store = MemoryUsageStore::new(UsageLimits::default());
        let decision = store.check("1.2.3.4", UsageKind::AnswerAnalysis).await.unwrap();
        assert!(decision.allowed);
        assert_eq!(
            decision.remaining,
            Some(UsageCount {
                daily: 100,
                hourly: 50
            })
        );
    }

    async fn take(store: &MemoryUsageStore, client_id: &str, kind: UsageKind) {
        assert!(store.reserve(client_id, kind).await.unwrap().allowed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hourly_limit_blocks_then_resets_after_an_hour() {
        let store = MemoryUsageStore::new(small_limits());
        take(&store, "c", UsageKind::AnswerAnalysis).await;
        take(&store, "c", UsageKind::AnswerAnalysis).await;

        let blocked = store.reserve("c", UsageKind::AnswerAnalysis).await.unwrap();
        assert!(!blocked.allowed);
        assert!(blocked.message.unwrap().contains("시간당 2회"));

        tokio::time::advance(HOUR + Duration::from_secs(1)).await;

        let decision = store.check("c", UsageKind::AnswerAnalysis).await.unwrap();
        assert!(decision.allowed);
        assert_eq!(
            decision.remaining,
            Some(UsageCount {
                daily: 1,
                hourly: 2
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_daily_limit_outlives_hourly_reset() {
        let store = MemoryUsageStore::new(small_limits());
        take(&store, "c", UsageKind::AnswerAnalysis).await;
        take(&store, "c", UsageKind::AnswerAnalysis).await;
        tokio::time::advance(HOUR + Duration::from_secs(1)).await;
        take(&store, "c", UsageKind::AnswerAnalysis).await;

        let blocked = store.check("c", UsageKind::AnswerAnalysis).await.unwrap();
        assert!(!blocked.allowed);
        assert!(blocked.message.unwrap().contains("일일 3회"));

        tokio::time::advance(DAY).await;
        assert!(store.check("c", UsageKind::AnswerAnalysis).await.unwrap().allowed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_kinds_and_clients_are_independent() {
        let store = MemoryUsageStore::new(small_limits());
        take(&store, "a", UsageKind::AnswerAnalysis).await;
        take(&store, "a", UsageKind::AnswerAnalysis).await;

        assert!(!store.check("a", UsageKind::AnswerAnalysis).await.unwrap().allowed);
        assert!(store.check("a", UsageKind::QuestionGeneration).await.unwrap().allowed);
        assert!(store.check("b", UsageKind::AnswerAnalysis).await.unwrap().allowed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_denied_reservation_is_not_counted() {
        let store = MemoryUsageStore::new(small_limits());
        take(&store, "c", UsageKind::AnswerAnalysis).await;
        take(&store, "c", UsageKind::AnswerAnalysis).await;

        for _ in 0..3 {
            assert!(!store.reserve("c", UsageKind::AnswerAnalysis).await.unwrap().allowed);
        }
        assert_eq!(
            store.usage("c", UsageKind::AnswerAnalysis).await.unwrap(),
            UsageCount { daily: 2, hourly: 2 }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_release_returns_slot_and_floors_at_zero() {
        let store = MemoryUsageStore::new(small_limits());
        take(&store, "c", UsageKind::AnswerAnalysis).await;
        take(&store, "c", UsageKind::AnswerAnalysis).await;
        store.release("c", UsageKind::AnswerAnalysis).await.unwrap();
        assert!(store.check("c", UsageKind::AnswerAnalysis).await.unwrap().allowed);

        store.release("c", UsageKind::AnswerAnalysis).await.unwrap();
        store.release("c", UsageKind::AnswerAnalysis).await.unwrap();
        assert_eq!(
            store.usage("c", UsageKind::AnswerAnalysis).await.unwrap(),
            UsageCount::default()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_reservations_respect_limit() {
        let store = std::sync::Arc::new(MemoryUsageStore::new(small_limits()));
        let attempts: Vec<_> = (0..10)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    store.reserve("c", UsageKind::AnswerAnalysis).await.unwrap().allowed
                })
            })
            .collect();

        let mut granted = 0;
        for attempt in attempts {
            if attempt.await.unwrap() {
                granted += 1;
            }
        }
        assert_eq!(granted, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_drops_idle_clients_only() {
        let store = MemoryUsageStore::new(small_limits());
        take(&store, "idle", UsageKind::AnswerAnalysis).await;
        tokio::time::advance(STALE_AFTER + Duration::from_secs(1)).await;
        take(&store, "active", UsageKind::AnswerAnalysis).await;

        assert_eq!(store.cleanup_stale(), 1);
        assert_eq!(store.tracked_clients(), 1);
    }
}
