//! In-memory session store.
//!
//! Each session is an `Arc<Mutex<SessionRecord>>` in a map guarded by an
//! `RwLock`. The map lock is only held to find or insert the record; the
//! per-session mutex is what serializes requests for one key.
//!
//! Every new caller gets a record, including greetings that never fill a
//! slot. At capacity those empty records are reclaimed before a new key is
//! refused, so only sessions holding a country count against the limit.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::domain::foundation::{SessionKey, Timestamp};
use crate::domain::intake::SessionState;
use crate::ports::{SessionLease, SessionRecord, SessionStore, SessionStoreError};

/// Default cap on live sessions.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

type SharedRecord = Arc<Mutex<SessionRecord>>;

/// Session store for single-process deployments.
#[derive(Debug, Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionKey, SharedRecord>>>,
    max_sessions: usize,
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SESSIONS)
    }
}

impl InMemorySessionStore {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            max_sessions,
        }
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    async fn record_for(&self, key: &SessionKey) -> Result<SharedRecord, SessionStoreError> {
        if let Some(record) = self.sessions.read().await.get(key) {
            return Ok(record.clone());
        }

        let mut sessions = self.sessions.write().await;
        // Another request may have inserted it between the two locks.
        if let Some(record) = sessions.get(key) {
            return Ok(record.clone());
        }
        if sessions.len() >= self.max_sessions {
            let reclaimed = reclaim_empty(&mut sessions);
            tracing::debug!(reclaimed, "Session store at capacity");
            if sessions.len() >= self.max_sessions {
                return Err(SessionStoreError::CapacityExceeded {
                    max: self.max_sessions,
                });
            }
        }
        let record = Arc::new(Mutex::new(SessionRecord::new(Timestamp::now())));
        sessions.insert(*key, record.clone());
        Ok(record)
    }
}

/// True while a request holds, or is about to lock, the record.
fn in_use(record: &SharedRecord) -> bool {
    Arc::strong_count(record) > 1
}

/// Drops unheld records with both slots UNKNOWN. Returns how many went.
fn reclaim_empty(sessions: &mut HashMap<SessionKey, SharedRecord>) -> usize {
    let before = sessions.len();
    sessions.retain(|_, record| {
        if in_use(record) {
            return true;
        }
        match record.try_lock() {
            Ok(guard) => !guard.state.is_empty(),
            Err(_) => true,
        }
    });
    before - sessions.len()
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn acquire(&self, key: &SessionKey) -> Result<SessionLease, SessionStoreError> {
        let record = self.record_for(key).await?;
        let mut guard = record.lock_owned().await;
        guard.last_seen = Timestamp::now();
        Ok(SessionLease::new(*key, guard))
    }

    async fn snapshot(&self, key: &SessionKey) -> Result<Option<SessionState>, SessionStoreError> {
        let record = match self.sessions.read().await.get(key) {
            Some(record) => record.clone(),
            None => return Ok(None),
        };
        let state = record.lock().await.state;
        Ok(Some(state))
    }

    async fn evict_idle(&self, cutoff: Timestamp) -> Result<usize, SessionStoreError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, record| {
            if in_use(record) {
                return true;
            }
            match record.try_lock() {
                Ok(guard) => !guard.last_seen.is_before(&cutoff),
                Err(_) => true,
            }
        });
        Ok(before - sessions.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::CountrySlot;
    use std::time::Duration;

    fn french_to_japan() -> SessionState {
        SessionState::new(CountrySlot::coerce("FRA"), CountrySlot::coerce("JPN"))
    }

    #[tokio::test]
    async fn acquire_creates_empty_session() {
        let store = InMemorySessionStore::default();
        let key = SessionKey::new();

        let lease = store.acquire(&key).await.unwrap();
        assert!(lease.state().is_empty());
        drop(lease);

        assert_eq!(store.len().await, 1);
        assert_eq!(store.snapshot(&key).await.unwrap(), Some(SessionState::empty()));
    }

    #[tokio::test]
    async fn stored_state_persists_across_leases() {
        let store = InMemorySessionStore::default();
        let key = SessionKey::new();

        store.acquire(&key).await.unwrap().store(french_to_japan());

        let lease = store.acquire(&key).await.unwrap();
        assert_eq!(lease.state(), french_to_japan());
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let store = InMemorySessionStore::default();
        let a = SessionKey::new();
        let b = SessionKey::new();

        store.acquire(&a).await.unwrap().store(french_to_japan());

        assert!(store.acquire(&b).await.unwrap().state().is_empty());
    }

    #[tokio::test]
    async fn snapshot_of_unknown_session_is_none() {
        let store = InMemorySessionStore::default();
        assert_eq!(store.snapshot(&SessionKey::new()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn second_lease_waits_for_first() {
        let store = InMemorySessionStore::default();
        let key = SessionKey::new();

        let first = store.acquire(&key).await.unwrap();

        let contender = {
            let store = store.clone();
            tokio::spawn(async move {
                let lease = store.acquire(&key).await.unwrap();
                lease.state()
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        let mut first = first;
        first.store(french_to_japan());
        drop(first);

        assert_eq!(contender.await.unwrap(), french_to_japan());
    }

    #[tokio::test]
    async fn capacity_is_enforced_for_new_keys_only() {
        let store = InMemorySessionStore::new(1);
        let key = SessionKey::new();
        store.acquire(&key).await.unwrap().store(french_to_japan());

        let err = store.acquire(&SessionKey::new()).await.unwrap_err();
        assert!(matches!(err, SessionStoreError::CapacityExceeded { max: 1 }));

        assert!(store.acquire(&key).await.is_ok());
    }

    #[tokio::test]
    async fn empty_sessions_are_reclaimed_at_capacity() {
        let store = InMemorySessionStore::new(2);
        let kept = SessionKey::new();
        store.acquire(&kept).await.unwrap().store(french_to_japan());
        drop(store.acquire(&SessionKey::new()).await.unwrap());

        let newcomer = SessionKey::new();
        let mut lease = store.acquire(&newcomer).await.unwrap();
        lease.store(french_to_japan());
        drop(lease);

        assert_eq!(store.len().await, 2);
        assert_eq!(store.snapshot(&kept).await.unwrap(), Some(french_to_japan()));
        assert_eq!(
            store.snapshot(&newcomer).await.unwrap(),
            Some(french_to_japan())
        );
    }

    #[tokio::test]
    async fn held_empty_session_is_not_reclaimed() {
        let store = InMemorySessionStore::new(1);
        let held = store.acquire(&SessionKey::new()).await.unwrap();

        let err = store.acquire(&SessionKey::new()).await.unwrap_err();
        assert!(matches!(err, SessionStoreError::CapacityExceeded { max: 1 }));
        drop(held);
    }

    #[tokio::test]
    async fn partially_filled_session_is_not_reclaimed() {
        let store = InMemorySessionStore::new(1);
        let key = SessionKey::new();
        store
            .acquire(&key)
            .await
            .unwrap()
            .store(SessionState::new(CountrySlot::coerce("FRA"), CountrySlot::Unknown));

        assert!(store.acquire(&SessionKey::new()).await.is_err());
        assert!(store.snapshot(&key).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn evict_idle_drops_old_sessions() {
        let store = InMemorySessionStore::default();
        drop(store.acquire(&SessionKey::new()).await.unwrap());
        drop(store.acquire(&SessionKey::new()).await.unwrap());

        let evicted = store
            .evict_idle(Timestamp::now().plus_secs(60))
            .await
            .unwrap();

        assert_eq!(evicted, 2);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn evict_idle_keeps_recent_sessions() {
        let store = InMemorySessionStore::default();
        drop(store.acquire(&SessionKey::new()).await.unwrap());

        let evicted = store
            .evict_idle(Timestamp::now().minus_secs(60))
            .await
            .unwrap();

        assert_eq!(evicted, 0);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn evict_idle_never_drops_a_held_session() {
        let store = InMemorySessionStore::default();
        let key = SessionKey::new();
        let mut lease = store.acquire(&key).await.unwrap();
        lease.store(french_to_japan());

        let evicted = store
            .evict_idle(Timestamp::now().plus_secs(60))
            .await
            .unwrap();
        assert_eq!(evicted, 0);

        drop(lease);
        assert_eq!(store.snapshot(&key).await.unwrap(), Some(french_to_japan()));
    }
}
