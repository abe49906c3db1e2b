//! Background eviction of idle sessions.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::domain::foundation::Timestamp;
use crate::ports::SessionStore;

/// Spawns a task that evicts sessions idle for longer than `idle`.
///
/// The store is checked every `idle / 4`, but at least once a second.
pub fn spawn_idle_sweep(store: Arc<dyn SessionStore>, idle: Duration) -> JoinHandle<()> {
    let period = (idle / 4).max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            sweep_once(store.as_ref(), idle).await;
        }
    })
}

/// Evicts sessions last seen before `now - idle`.
pub async fn sweep_once(store: &dyn SessionStore, idle: Duration) -> usize {
    let cutoff = Timestamp::now().minus_secs(idle.as_secs());
    match store.evict_idle(cutoff).await {
        Ok(0) => 0,
        Ok(evicted) => {
            tracing::debug!(evicted, "Evicted idle sessions");
            evicted
        }
        Err(e) => {
            tracing::warn!(error = %e, "Idle session sweep failed");
            0
        }
    }
}
