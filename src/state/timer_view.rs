//! Outward view of the timer for presentation layers

use serde::{Deserialize, Serialize};

use super::timer_state::{format_time, Phase, RunState, TimerState};

/// What a button or display needs to render the timer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerView {
    pub phase: Phase,
    pub state: RunState,
    pub time_remaining: u32,
    pub show_notification: bool,
    pub notification_message: Option<String>,
    /// `MM:SS` rendering of `time_remaining`
    pub display: String,
}

impl TimerView {
    pub fn new(state: &TimerState, notification: Option<&str>) -> Self {
        Self {
            phase: state.phase,
            state: state.run_state,
            time_remaining: state.time_remaining,
            show_notification: notification.is_some(),
            notification_message: notification.map(str::to_string),
            display: format_time(state.time_remaining),
        }
    }
}

impl Default for TimerView {
    fn default() -> Self {
        Self::new(&TimerState::idle(), None)
    }
}
