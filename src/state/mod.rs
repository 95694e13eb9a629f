//! State management module
//!
//! The timer's pure state machine, its persisted form, and the shared
//! application state handed to HTTP handlers.

pub mod app_state;
pub mod snapshot;
pub mod timer_state;
pub mod timer_view;

// Re-export main types
pub use app_state::AppState;
pub use snapshot::{reconcile, PersistedSnapshot};
pub use timer_state::{
    format_time, reduce, Action, Phase, RunState, TimerState, BREAK_SECONDS, WORK_SECONDS,
};
pub use timer_view::TimerView;
