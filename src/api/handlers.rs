//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use tracing::error;

use crate::{
    state::{format_time, AppState, TimerView},
    tasks::TimerCommand,
};
use super::responses::{ActionResponse, HealthResponse, StatusResponse};

async fn run_command(
    state: &AppState,
    command: TimerCommand,
) -> Result<Json<ActionResponse>, StatusCode> {
    match state.perform(command).await {
        Ok(view) => {
            let message = describe(command, &view);
            Ok(Json(ActionResponse::new(message, view)))
        }
        Err(e) => {
            error!("Timer {} failed: {}", command.name(), e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

fn describe(command: TimerCommand, view: &TimerView) -> String {
    let phase = view.phase.as_str();
    match command {
        TimerCommand::Start => format!("Timer running, {} {} left", phase, format_time(view.time_remaining)),
        TimerCommand::Pause => format!("Timer paused at {} in {} phase", format_time(view.time_remaining), phase),
        TimerCommand::Reset => "Timer reset".to_string(),
        TimerCommand::SkipToNextPhase => format!("Timer in {} phase, {} left", phase, format_time(view.time_remaining)),
        TimerCommand::DismissNotification => "Notification dismissed".to_string(),
    }
}

/// Handle GET /pomodoro - Current timer view
pub async fn timer_handler(State(state): State<Arc<AppState>>) -> Json<TimerView> {
    Json(state.timer_view())
}

/// Handle POST /pomodoro/start
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Result<Json<ActionResponse>, StatusCode> {
    run_command(&state, TimerCommand::Start).await
}

/// Handle POST /pomodoro/pause
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> Result<Json<ActionResponse>, StatusCode> {
    run_command(&state, TimerCommand::Pause).await
}

/// Handle POST /pomodoro/reset
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<ActionResponse>, StatusCode> {
    run_command(&state, TimerCommand::Reset).await
}

/// Handle POST /pomodoro/skip
pub async fn skip_handler(State(state): State<Arc<AppState>>) -> Result<Json<ActionResponse>, StatusCode> {
    run_command(&state, TimerCommand::SkipToNextPhase).await
}

/// Handle POST /pomodoro/notification/dismiss
pub async fn dismiss_handler(State(state): State<Arc<AppState>>) -> Result<Json<ActionResponse>, StatusCode> {
    run_command(&state, TimerCommand::DismissNotification).await
}

/// Handle GET /status - Timer view plus server metadata
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        timer: state.timer_view(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
