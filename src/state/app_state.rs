//! Main application state shared with the HTTP handlers

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::TimerView;
use crate::{
    errors::TimerError,
    tasks::{TimerCommand, TimerHandle},
};

/// Application state: the timer handle plus server metadata
#[derive(Debug)]
pub struct AppState {
    /// Handle to the timer task
    pub timer: TimerHandle,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl AppState {
    pub fn new(timer: TimerHandle, port: u16, host: String) -> Self {
        Self {
            timer,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
        }
    }

    /// Forward a command to the timer task and record it as the last action
    pub async fn perform(&self, command: TimerCommand) -> Result<TimerView, TimerError> {
        info!("Timer action requested: {}", command.name());
        let view = self.timer.send(command).await?;

        match self.last_action.lock() {
            Ok(mut last_action) => *last_action = Some(command.name().to_string()),
            Err(e) => warn!("Failed to record last action: {}", e),
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }

        Ok(view)
    }

    /// Latest published timer view
    pub fn timer_view(&self) -> TimerView {
        self.timer.view()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
