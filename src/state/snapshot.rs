//! Persisted timer snapshot and reconciliation after a reload

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::timer_state::{Phase, RunState, TimerState};

/// Timer state as written to session storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSnapshot {
    pub phase: Phase,
    pub state: RunState,
    pub time_remaining: i64,
    /// Wall-clock time of the write, epoch milliseconds
    pub last_updated: i64,
}

impl PersistedSnapshot {
    /// Capture `state` as of `now_ms`
    pub fn capture(state: &TimerState, now_ms: i64) -> Self {
        Self {
            phase: state.phase,
            state: state.run_state,
            time_remaining: i64::from(state.time_remaining),
            last_updated: now_ms,
        }
    }

    /// Parse a stored snapshot. Unknown phases or states fail here.
    pub fn parse(raw: &str) -> Option<Self> {
        match serde_json::from_str(raw) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!("Discarding unreadable timer snapshot: {}", e);
                None
            }
        }
    }

    /// Range checks that serde cannot express
    pub fn validate(&self, now_ms: i64) -> Result<(), String> {
        if self.time_remaining < 0 {
            return Err(format!("negative timeRemaining {}", self.time_remaining));
        }
        if u32::try_from(self.time_remaining).is_err() {
            return Err(format!("timeRemaining {} out of range", self.time_remaining));
        }
        if self.last_updated <= 0 {
            return Err(format!("non-positive lastUpdated {}", self.last_updated));
        }
        if self.last_updated > now_ms {
            return Err(format!(
                "lastUpdated {} is in the future (now {})",
                self.last_updated, now_ms
            ));
        }
        Ok(())
    }
}

/// Compute the live state from a snapshot written before a reload.
///
/// A running timer that ran out while unobserved is advanced by exactly one
/// phase; any further elapsed time is dropped.
pub fn reconcile(snapshot: Option<&PersistedSnapshot>, now_ms: i64) -> TimerState {
    let Some(snapshot) = snapshot else {
        return TimerState::idle();
    };

    if let Err(reason) = snapshot.validate(now_ms) {
        warn!("Ignoring invalid timer snapshot: {}", reason);
        return TimerState::idle();
    }

    let time_remaining = u32::try_from(snapshot.time_remaining).unwrap_or(0);

    if snapshot.state != RunState::Running {
        return TimerState {
            phase: snapshot.phase,
            run_state: snapshot.state,
            time_remaining,
            transition_suppressed: false,
        };
    }

    let elapsed_seconds = (now_ms - snapshot.last_updated) / 1000;
    let remaining = (snapshot.time_remaining - elapsed_seconds).max(0);

    if remaining > 0 {
        debug!(
            "Resuming {} phase with {}s left after {}s away",
            snapshot.phase.as_str(),
            remaining,
            elapsed_seconds
        );
        return TimerState {
            phase: snapshot.phase,
            run_state: RunState::Running,
            time_remaining: u32::try_from(remaining).unwrap_or(time_remaining),
            transition_suppressed: false,
        };
    }

    let next = snapshot.phase.next();
    debug!(
        "{} phase finished while away, resuming in {} phase",
        snapshot.phase.as_str(),
        next.as_str()
    );
    TimerState::entering(next, true)
}
