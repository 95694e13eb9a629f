//! Background tasks module
//!
//! This module contains the timer task that runs alongside the HTTP server
//! and the dispatcher for its side effects.

pub mod dispatcher;
pub mod pomodoro_timer;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export main types
pub use dispatcher::{SideEffectDispatcher, NOTIFICATION_DISMISS_DELAY};
pub use pomodoro_timer::{spawn_timer, PomodoroTimer, TimerCommand, TimerHandle, TICK_INTERVAL};
