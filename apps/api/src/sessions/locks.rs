use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type LockMap = HashMap<String, Arc<AsyncMutex<()>>>;

/// One async lock per owner, created on demand. An entry lives only while someone holds
/// or waits for it, so the map stays as small as the set of owners with requests in
/// flight.
#[derive(Clone, Default)]
pub struct OwnerLocks {
    locks: Arc<Mutex<LockMap>>,
}

impl OwnerLocks {
    pub async fn acquire(&self, owner: &str) -> OwnerGuard {
        let lock = self
            .locks
            .lock()
            .entry(owner.to_string())
            .or_default()
            .clone();
        OwnerGuard {
            guard: lock.lock_owned().await,
            locks: self.locks.clone(),
            owner: owner.to_string(),
        }
    }

    #[cfg(test)]
    pub fn tracked(&self) -> usize {
        self.locks.lock().len()
    }
}

pub struct OwnerGuard {
    guard: OwnedMutexGuard<()>,
    locks: Arc<Mutex<LockMap>>,
    owner: String,
}

impl Drop for OwnerGuard {
    fn drop(&mut self) {
        let mut locks = self.locks.lock();
        // waiters clone the Arc under this same map lock, so a count of two (map + us)
        // means nobody else wants it
        let idle = locks.get(&self.owner).is_some_and(|lock| {
            Arc::ptr_eq(lock, OwnedMutexGuard::mutex(&self.guard)) && Arc::strong_count(lock) == 2
        });
        if idle {
            locks.remove(&self.owner);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_entry_removed_after_last_holder() {
        let locks = OwnerLocks::default();
        {
            let _guard = locks.acquire("a").await;
            assert_eq!(locks.tracked(), 1);
        }
        assert_eq!(locks.tracked(), 0);

        for i in 0..100 {
            drop(locks.acquire(&format!("client-{i}")).await);
        }
        assert_eq!(locks.tracked(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waiter_keeps_entry_and_gets_the_same_lock() {
        let locks = OwnerLocks::default();
        let first = locks.acquire("a").await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire("a").await;
                locks.tracked()
            })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());

        drop(first);
        // the waiter still held a clone, so the entry survived the first release
        assert_eq!(waiter.await.unwrap(), 1);
        assert_eq!(locks.tracked(), 0);
    }

    #[tokio::test]
    async fn test_owners_do_not_block_each_other() {
        let locks = OwnerLocks::default();
        let _a = locks.acquire("a").await;
        let b = tokio::time::timeout(Duration::from_secs(1), locks.acquire("b")).await;
        assert!(b.is_ok());
        assert_eq!(locks.tracked(), 2);
    }
}
