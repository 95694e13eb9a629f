//! Phase-completion sound playback

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::errors::PlaybackError;
use crate::state::Phase;

/// A short sound played when a phase completes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clip {
    pub name: String,
    pub path: PathBuf,
}

impl Clip {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// The clips played for each completed phase
#[derive(Debug, Clone, Default)]
pub struct ClipSet {
    pub work_complete: Option<Clip>,
    pub break_complete: Option<Clip>,
}

impl ClipSet {
    /// Clip for the phase that just ended
    pub fn for_completed(&self, phase: Phase) -> Option<&Clip> {
        match phase {
            Phase::Work => self.work_complete.as_ref(),
            Phase::Break => self.break_complete.as_ref(),
        }
    }
}

/// Something that can play a clip. Implementations must not panic on
/// playback failure; the caller logs the error.
#[async_trait]
pub trait AudioPlayer: Send + Sync {
    async fn play(&self, clip: &Clip) -> Result<(), PlaybackError>;
}

/// Plays clips by handing the file to an external player command
#[derive(Debug, Clone)]
pub struct CommandAudioPlayer {
    player: String,
}

impl CommandAudioPlayer {
    pub fn new(player: impl Into<String>) -> Self {
        Self {
            player: player.into(),
        }
    }

    /// Check a clip is present locally so later playback does not fetch anything
    pub fn cache(&self, name: &str, path: &Path) -> Result<Clip, PlaybackError> {
        if !path.is_file() {
            return Err(PlaybackError::ClipMissing {
                path: path.to_path_buf(),
            });
        }
        info!("Cached {} clip from {}", name, path.display());
        Ok(Clip::new(name, path))
    }
}

#[async_trait]
impl AudioPlayer for CommandAudioPlayer {
    async fn play(&self, clip: &Clip) -> Result<(), PlaybackError> {
        if !clip.path.is_file() {
            return Err(PlaybackError::ClipMissing {
                path: clip.path.clone(),
            });
        }

        debug!("Playing {} clip with {}", clip.name, self.player);

        let output = Command::new(&self.player)
            .arg(&clip.path)
            .output()
            .await
            .map_err(|e| PlaybackError::Spawn {
                player: self.player.clone(),
                source: e,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("{} stderr: {}", self.player, stderr.trim());
            return Err(PlaybackError::PlayerFailed {
                player: self.player.clone(),
                code: output.status.code().unwrap_or(-1),
            });
        }

        Ok(())
    }
}

/// Used when no clips are configured
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentAudioPlayer;

#[async_trait]
impl AudioPlayer for SilentAudioPlayer {
    async fn play(&self, clip: &Clip) -> Result<(), PlaybackError> {
        debug!("Audio disabled, not playing {} clip", clip.name);
        Ok(())
    }
}
