//! Session Store Port - per-caller slot storage with exclusive access.
//!
//! `acquire` hands out a [`SessionLease`] that holds the session's lock for as
//! long as it lives. A request keeps its lease from reconciliation through
//! completion, so two requests for the same key never interleave their
//! writes. Different keys never contend.

use async_trait::async_trait;
use tokio::sync::OwnedMutexGuard;

use crate::domain::foundation::{SessionKey, Timestamp};
use crate::domain::intake::SessionState;

/// Stored data for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionRecord {
    pub state: SessionState,
    /// Last time a request acquired this session.
    pub last_seen: Timestamp,
}

impl SessionRecord {
    pub fn new(now: Timestamp) -> Self {
        Self {
            state: SessionState::empty(),
            last_seen: now,
        }
    }
}

/// Exclusive handle on one session's record.
pub struct SessionLease {
    key: SessionKey,
    guard: OwnedMutexGuard<SessionRecord>,
}

impl SessionLease {
    pub fn new(key: SessionKey, guard: OwnedMutexGuard<SessionRecord>) -> Self {
        Self { key, guard }
    }

    pub fn key(&self) -> SessionKey {
        self.key
    }

    /// Current slot values.
    pub fn state(&self) -> SessionState {
        self.guard.state
    }

    /// Replaces the slot values.
    pub fn store(&mut self, state: SessionState) {
        self.guard.state = state;
    }

    /// Resets both slots to UNKNOWN.
    pub fn clear(&mut self) {
        self.guard.state.clear();
    }
}

impl std::fmt::Debug for SessionLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionLease")
            .field("key", &self.key)
            .field("state", &self.guard.state)
            .finish()
    }
}

/// Errors from session storage.
#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("session capacity exceeded ({max} sessions)")]
    CapacityExceeded { max: usize },

    #[error("session store unavailable: {0}")]
    Unavailable(String),
}

/// Port for session slot storage.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Locks the session for `key`, creating an empty one on first use.
    ///
    /// Waits while another request holds the same session.
    async fn acquire(&self, key: &SessionKey) -> Result<SessionLease, SessionStoreError>;

    /// Reads the current slots without holding the lock afterwards.
    ///
    /// Returns `None` for sessions that were never created or were evicted.
    async fn snapshot(&self, key: &SessionKey) -> Result<Option<SessionState>, SessionStoreError>;

    /// Drops sessions not seen since `cutoff` that no request is using.
    ///
    /// Returns the number of evicted sessions.
    async fn evict_idle(&self, cutoff: Timestamp) -> Result<usize, SessionStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::CountrySlot;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[tokio::test]
    async fn lease_store_and_clear_update_record() {
        let record = Arc::new(Mutex::new(SessionRecord::new(Timestamp::now())));
        let key = SessionKey::new();

        {
            let mut lease = SessionLease::new(key, record.clone().lock_owned().await);
            let state = SessionState::new(CountrySlot::coerce("FRA"), CountrySlot::coerce("JPN"));
            lease.store(state);
            assert_eq!(lease.state(), state);
            assert_eq!(lease.key(), key);
        }
        assert!(record.lock().await.state.is_complete());

        {
            let mut lease = SessionLease::new(key, record.clone().lock_owned().await);
            lease.clear();
        }
        assert!(record.lock().await.state.is_empty());
    }

    #[test]
    fn capacity_error_displays_limit() {
        let err = SessionStoreError::CapacityExceeded { max: 10 };
        assert_eq!(err.to_string(), "session capacity exceeded (10 sessions)");
    }
}
