use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::info;
use uuid::Uuid;

/// How often expired sessions are looked for, at most.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

struct Slot<T> {
    session: Arc<Mutex<T>>,
    created_at: Instant,
}

/// Per-id session storage. Each session sits behind its own lock, so work on
/// one candidate never blocks another and no state is shared between them.
pub struct SessionRegistry<T> {
    sessions: Arc<RwLock<HashMap<Uuid, Slot<T>>>>,
}

impl<T> Clone for SessionRegistry<T> {
    fn clone(&self) -> Self {
        Self {
            sessions: Arc::clone(&self.sessions),
        }
    }
}

impl<T> Default for SessionRegistry<T> {
    fn default() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<T> SessionRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, session: T) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions.write().await.insert(
            id,
            Slot {
                session: Arc::new(Mutex::new(session)),
                created_at: Instant::now(),
            },
        );
        id
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<Mutex<T>>> {
        self.sessions
            .read()
            .await
            .get(&id)
            .map(|slot| Arc::clone(&slot.session))
    }

    /// Discards a session; returns false if it did not exist.
    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops sessions created more than `ttl` ago. A session whose lock is
    /// held is skipped and picked up by a later sweep. Returns how many were
    /// dropped.
    pub async fn evict_expired(&self, ttl: Duration) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, slot| {
            now.duration_since(slot.created_at) < ttl || slot.session.try_lock().is_err()
        });
        before - sessions.len()
    }
}

impl<T: Send + 'static> SessionRegistry<T> {
    /// Spawns a background task that evicts expired sessions for the
    /// lifetime of the process.
    pub fn spawn_sweeper(&self, ttl: Duration, kind: &'static str) {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(SWEEP_INTERVAL.min(ttl));
            loop {
                ticker.tick().await;
                let evicted = registry.evict_expired(ttl).await;
                if evicted > 0 {
                    info!("Evicted {evicted} expired {kind} sessions");
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let registry: SessionRegistry<Vec<u32>> = SessionRegistry::new();
        let a = registry.create(vec![]).await;
        let b = registry.create(vec![]).await;

        registry.get(a).await.unwrap().lock().await.push(1);

        assert_eq!(*registry.get(a).await.unwrap().lock().await, vec![1]);
        assert!(registry.get(b).await.unwrap().lock().await.is_empty());
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn test_remove() {
        let registry: SessionRegistry<u8> = SessionRegistry::new();
        let id = registry.create(1).await;
        assert!(registry.remove(id).await);
        assert!(!registry.remove(id).await);
        assert!(registry.get(id).await.is_none());
    }

    #[tokio::test]
    async fn test_clones_share_storage() {
        let registry: SessionRegistry<u8> = SessionRegistry::new();
        let id = registry.clone().create(7).await;
        assert_eq!(*registry.get(id).await.unwrap().lock().await, 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_evicts_only_expired_sessions() {
        let registry: SessionRegistry<u8> = SessionRegistry::new();
        let old = registry.create(1).await;
        tokio::time::advance(Duration::from_secs(90)).await;
        let fresh = registry.create(2).await;
        tokio::time::advance(Duration::from_secs(20)).await;

        assert_eq!(registry.evict_expired(Duration::from_secs(100)).await, 1);
        assert!(registry.get(old).await.is_none());
        assert!(registry.get(fresh).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_busy_session_survives_sweep() {
        let registry: SessionRegistry<u8> = SessionRegistry::new();
        let id = registry.create(1).await;
        tokio::time::advance(Duration::from_secs(10)).await;

        let handle = registry.get(id).await.unwrap();
        let guard = handle.lock().await;
        assert_eq!(registry.evict_expired(Duration::from_secs(5)).await, 0);
        drop(guard);
        assert_eq!(registry.evict_expired(Duration::from_secs(5)).await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_evicts_in_background() {
        let registry: SessionRegistry<u8> = SessionRegistry::new();
        let id = registry.create(1).await;
        registry.spawn_sweeper(Duration::from_secs(30), "test");

        tokio::time::sleep(Duration::from_secs(65)).await;
        assert!(registry.get(id).await.is_none());
    }
}
