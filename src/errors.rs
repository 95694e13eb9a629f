//! Error types for the timer core and its collaborators
//!
//! None of these are fatal: every caller recovers locally and logs.

use std::path::PathBuf;

/// Failures of the session storage medium
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage I/O failed for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Storage is unavailable: {message}")]
    Unavailable { message: String },
}

/// Failures while playing a cached audio clip
#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error("Audio clip not found at path: {path}")]
    ClipMissing { path: PathBuf },

    #[error("Failed to spawn audio player '{player}': {source}")]
    Spawn {
        player: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Audio player '{player}' exited with status {code}")]
    PlayerFailed { player: String, code: i32 },
}

/// Failures of the remote announce service
#[derive(Debug, thiserror::Error)]
pub enum AnnounceError {
    #[error("Invalid announce URL '{url}'")]
    InvalidUrl { url: String },

    #[error("Announce request failed: {source}")]
    Request {
        #[from]
        source: reqwest::Error,
    },

    #[error("Announce service answered with status {status}")]
    Status { status: u16 },
}

/// Failures talking to the timer task
#[derive(Debug, thiserror::Error)]
pub enum TimerError {
    #[error("Timer task is not running")]
    Unavailable,
}
