//! Timer state structure and the pure transition function over it

use serde::{Deserialize, Serialize};

/// Length of a work phase in seconds
pub const WORK_SECONDS: u32 = 25 * 60;
/// Length of a break phase in seconds
pub const BREAK_SECONDS: u32 = 5 * 60;

/// One of the two recurring intervals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Work,
    Break,
}

impl Phase {
    /// The phase that follows this one
    pub fn next(self) -> Self {
        match self {
            Phase::Work => Phase::Break,
            Phase::Break => Phase::Work,
        }
    }

    /// Full nominal duration of this phase in seconds
    pub fn duration_seconds(self) -> u32 {
        match self {
            Phase::Work => WORK_SECONDS,
            Phase::Break => BREAK_SECONDS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Work => "work",
            Phase::Break => "break",
        }
    }
}

/// Whether the countdown is advancing, frozen, or not started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Idle,
    Running,
    Paused,
}

impl RunState {
    pub fn as_str(self) -> &'static str {
        match self {
            RunState::Idle => "idle",
            RunState::Running => "running",
            RunState::Paused => "paused",
        }
    }
}

/// Actions accepted by [`reduce`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    Pause,
    Reset,
    Tick,
    TransitionPhase,
    /// Like `TransitionPhase`, but ignored while idle.
    SkipToNextPhase,
    ClearTransitionFlag,
}

/// Live timer state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerState {
    pub phase: Phase,
    pub run_state: RunState,
    pub time_remaining: u32,
    /// Set for one iteration after a reload synthesized a completed phase,
    /// so its sound and notification are not replayed.
    pub transition_suppressed: bool,
}

impl TimerState {
    /// The canonical idle state: work phase, full duration, not started
    pub fn idle() -> Self {
        Self {
            phase: Phase::Work,
            run_state: RunState::Idle,
            time_remaining: WORK_SECONDS,
            transition_suppressed: false,
        }
    }

    /// A running state at the start of `phase`
    pub fn entering(phase: Phase, transition_suppressed: bool) -> Self {
        Self {
            phase,
            run_state: RunState::Running,
            time_remaining: phase.duration_seconds(),
            transition_suppressed,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.run_state == RunState::Idle
    }

    pub fn is_running(&self) -> bool {
        self.run_state == RunState::Running
    }

    /// True when a running countdown has hit zero and the dispatcher must react
    pub fn is_phase_complete(&self) -> bool {
        self.is_running() && self.time_remaining == 0
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::idle()
    }
}

/// Apply `action` to `state`, returning the next state
pub fn reduce(state: &TimerState, action: Action) -> TimerState {
    match action {
        Action::Start => match state.run_state {
            RunState::Idle | RunState::Paused => TimerState {
                run_state: RunState::Running,
                ..*state
            },
            RunState::Running => *state,
        },
        Action::Pause => match state.run_state {
            RunState::Running => TimerState {
                run_state: RunState::Paused,
                ..*state
            },
            _ => *state,
        },
        Action::Reset => TimerState::idle(),
        Action::Tick => {
            if !state.is_running() {
                return *state;
            }
            TimerState {
                time_remaining: state.time_remaining.saturating_sub(1),
                ..*state
            }
        }
        Action::TransitionPhase => TimerState::entering(state.phase.next(), false),
        Action::SkipToNextPhase => {
            if state.is_idle() {
                return *state;
            }
            TimerState::entering(state.phase.next(), false)
        }
        Action::ClearTransitionFlag => TimerState {
            transition_suppressed: false,
            ..*state
        },
    }
}

/// Render seconds as `MM:SS`
pub fn format_time(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
