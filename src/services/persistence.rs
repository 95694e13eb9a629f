//! Timer snapshot persistence on top of session storage
//!
//! Every storage failure is logged and degrades to "no persistence".

use std::sync::Arc;
use tracing::{debug, warn};

use super::storage::SessionStorage;
use crate::state::{PersistedSnapshot, TimerState};

/// Storage key of the timer snapshot
pub const SNAPSHOT_KEY: &str = "pomodoroTimerState";

/// Load/save/clear adapter for the timer snapshot
#[derive(Clone)]
pub struct SnapshotStore {
    storage: Arc<dyn SessionStorage>,
}

impl SnapshotStore {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self { storage }
    }

    /// Read the stored snapshot, if any and if readable
    pub fn load(&self) -> Option<PersistedSnapshot> {
        match self.storage.get(SNAPSHOT_KEY) {
            Ok(Some(raw)) => PersistedSnapshot::parse(&raw),
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to load timer snapshot: {}", e);
                None
            }
        }
    }

    /// Write `state` as of `now_ms`
    pub fn save(&self, state: &TimerState, now_ms: i64) {
        let snapshot = PersistedSnapshot::capture(state, now_ms);
        let raw = match serde_json::to_string(&snapshot) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to encode timer snapshot: {}", e);
                return;
            }
        };

        if let Err(e) = self.storage.set(SNAPSHOT_KEY, &raw) {
            warn!("Failed to save timer snapshot: {}", e);
        } else {
            debug!(
                "Saved timer snapshot: {} {} {}s",
                snapshot.phase.as_str(),
                snapshot.state.as_str(),
                snapshot.time_remaining
            );
        }
    }

    /// Delete the stored snapshot
    pub fn clear(&self) {
        if let Err(e) = self.storage.remove(SNAPSHOT_KEY) {
            warn!("Failed to clear timer snapshot: {}", e);
        } else {
            debug!("Cleared timer snapshot");
        }
    }
}
