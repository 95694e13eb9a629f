//! Focus Timer - A reload-safe work/break interval timer
//!
//! This library provides the timer core of a home dashboard: a pure state
//! machine, reconciliation of a persisted snapshot after a restart, a
//! one-second tick task, and the side effects of completed phases (sound,
//! notification, remote announcement).

pub mod config;
pub mod errors;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::AppState;
pub use api::create_router;
pub use tasks::{spawn_timer, PomodoroTimer, TimerHandle};
pub use utils::signals::shutdown_signal;
