use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::Script;
use tracing::info;

use super::{RateLimitDecision, UsageCount, UsageError, UsageKind, UsageLimits, UsageStore};

/// KEYS: hourly, daily. ARGV: hourly limit, daily limit, hourly ttl, daily ttl.
/// Counts the call only when both windows have room. The TTL is set in the same script
/// as the first increment, so a counter key never outlives its window.
const RESERVE_SCRIPT: &str = r"
local hourly = tonumber(redis.call('GET', KEYS[1]) or '0')
local daily = tonumber(redis.call('GET', KEYS[2]) or '0')
if hourly < tonumber(ARGV[1]) and daily < tonumber(ARGV[2]) then
  if redis.call('INCR', KEYS[1]) == 1 then redis.call('EXPIRE', KEYS[1], ARGV[3]) end
  if redis.call('INCR', KEYS[2]) == 1 then redis.call('EXPIRE', KEYS[2], ARGV[4]) end
end
return {hourly, daily}
";

/// Decrements live counters only. A key that already expired is left absent rather
/// than recreated without a TTL.
const RELEASE_SCRIPT: &str = r"
for _, key in ipairs(KEYS) do
  local count = tonumber(redis.call('GET', key) or '0')
  if count > 0 then redis.call('DECR', key) end
end
return 0
";

#[derive(Debug, Clone, Copy)]
enum Window {
    Hourly,
    Daily,
}

impl Window {
    fn as_str(&self) -> &'static str {
        match self {
            Window::Hourly => "hourly",
            Window::Daily => "daily",
        }
    }

    fn ttl_secs(&self) -> i64 {
        match self {
            Window::Hourly => 60 * 60,
            Window::Daily => 24 * 60 * 60,
        }
    }
}

fn key(kind: UsageKind, window: Window, client_id: &str) -> String {
    format!("usage:{}:{}:{}", kind.as_str(), window.as_str(), client_id)
}

/// Usage store shared across instances. Each window is a counter key whose TTL is set
/// on the first increment, so the window restarts once the key expires.
#[derive(Clone)]
pub struct RedisUsageStore {
    conn: MultiplexedConnection,
    limits: UsageLimits,
    reserve_script: Script,
    release_script: Script,
}

impl RedisUsageStore {
    pub async fn connect(client: &redis::Client, limits: UsageLimits) -> Result<Self, UsageError> {
        let conn = client.get_multiplexed_tokio_connection().await?;
        info!("Redis usage store connected");
        Ok(Self {
            conn,
            limits,
            reserve_script: Script::new(RESERVE_SCRIPT),
            release_script: Script::new(RELEASE_SCRIPT),
        })
    }
}

#[async_trait]
impl UsageStore for RedisUsageStore {
    fn limits(&self) -> &UsageLimits {
        &self.limits
    }

    async fn usage(&self, client_id: &str, kind: UsageKind) -> Result<UsageCount, UsageError> {
        let mut conn = self.conn.clone();
        let (hourly, daily): (Option<u32>, Option<u32>) = redis::pipe()
            .get(key(kind, Window::Hourly, client_id))
            .get(key(kind, Window::Daily, client_id))
            .query_async(&mut conn)
            .await?;
        Ok(UsageCount {
            daily: daily.unwrap_or(0),
            hourly: hourly.unwrap_or(0),
        })
    }

    async fn reserve(
        &self,
        client_id: &str,
        kind: UsageKind,
    ) -> Result<RateLimitDecision, UsageError> {
        let mut conn = self.conn.clone();
        let limit = self.limits.for_kind(kind);
        let (hourly, daily): (u32, u32) = self
            .reserve_script
            .key(key(kind, Window::Hourly, client_id))
            .key(key(kind, Window::Daily, client_id))
            .arg(limit.hourly)
            .arg(limit.daily)
            .arg(Window::Hourly.ttl_secs())
            .arg(Window::Daily.ttl_secs())
            .invoke_async(&mut conn)
            .await?;
        Ok(RateLimitDecision::evaluate(UsageCount { daily, hourly }, limit))
    }

    async fn release(&self, client_id: &str, kind: UsageKind) -> Result<(), UsageError> {
        let mut conn = self.conn.clone();
        let _: i64 = self
            .release_script
            .key(key(kind, Window::Hourly, client_id))
            .key(key(kind, Window::Daily, client_id))
            .invoke_async(&mut conn)
            .await?;
        Ok(())
    }
}
