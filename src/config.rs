//! Configuration and CLI argument handling

use clap::Parser;
use std::path::PathBuf;

use crate::services::default_session_dir;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "focus-timer")]
#[command(about = "A reload-safe work/break interval timer for a home dashboard")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Session directory for the timer snapshot (defaults to the runtime dir)
    #[arg(long)]
    pub state_dir: Option<PathBuf>,

    /// Sound played when a work phase completes
    #[arg(long)]
    pub work_sound: Option<PathBuf>,

    /// Sound played when a break phase completes
    #[arg(long)]
    pub break_sound: Option<PathBuf>,

    /// Command used to play sounds; receives the clip path as its argument
    #[arg(long, default_value = "paplay")]
    pub player: String,

    /// Base URL of the speaker announce service, e.g. http://sonos.local:5005
    #[arg(long)]
    pub announce_url: Option<String>,

    /// Speaker (zone) that announcements are spoken on
    #[arg(long, default_value = "Kontor")]
    pub speaker: String,

    /// Announcement volume, 0-100
    #[arg(long, default_value = "40", value_parser = clap::value_parser!(u8).range(0..=100))]
    pub volume: u8,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Directory holding the session-scoped snapshot
    pub fn session_dir(&self) -> PathBuf {
        self.state_dir.clone().unwrap_or_else(default_session_dir)
    }
}
