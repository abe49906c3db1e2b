//! Session store adapters.

mod in_memory;
mod sweep;

pub use in_memory::{InMemorySessionStore, DEFAULT_MAX_SESSIONS};
pub use sweep::{spawn_idle_sweep, sweep_once};
