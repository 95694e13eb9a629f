//! Remote spoken announcements (e.g. text-to-speech on a Sonos speaker)

use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::debug;

use crate::errors::AnnounceError;

const ANNOUNCE_TIMEOUT: Duration = Duration::from_secs(5);

/// Phrase spoken when the timer starts
pub const START_PHRASE: &str = "let's go";
/// Phrase spoken when the timer pauses
pub const PAUSE_PHRASE: &str = "let's pause";

/// A remote service that can speak a short phrase. Treated as unreliable.
#[async_trait]
pub trait Announcer: Send + Sync {
    async fn announce(&self, message: &str) -> Result<(), AnnounceError>;
}

/// Speaks through a node-sonos-http-api style `/{speaker}/say/{text}/{volume}` endpoint
#[derive(Debug, Clone)]
pub struct SonosAnnouncer {
    client: Client,
    base_url: String,
    speaker: String,
    volume: u8,
}

impl SonosAnnouncer {
    pub fn new(base_url: impl Into<String>, speaker: impl Into<String>, volume: u8) -> Self {
        let client = Client::builder()
            .timeout(ANNOUNCE_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: base_url.into(),
            speaker: speaker.into(),
            volume: volume.min(100),
        }
    }

    /// Build the request URL, percent-encoding each path segment
    pub fn say_url(&self, message: &str) -> Result<Url, AnnounceError> {
        let invalid = || AnnounceError::InvalidUrl {
            url: self.base_url.clone(),
        };
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        let volume = self.volume.to_string();
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend([self.speaker.as_str(), "say", message, volume.as_str()]);
        Ok(url)
    }
}

#[async_trait]
impl Announcer for SonosAnnouncer {
    async fn announce(&self, message: &str) -> Result<(), AnnounceError> {
        let url = self.say_url(message)?;
        debug!("Announcing \"{}\" on {}", message, self.speaker);

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(AnnounceError::Status {
                status: response.status().as_u16(),
            });
        }
        Ok(())
    }
}

/// Used when no announce service is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAnnouncer;

#[async_trait]
impl Announcer for NoopAnnouncer {
    async fn announce(&self, message: &str) -> Result<(), AnnounceError> {
        debug!("Announcements disabled, not speaking \"{}\"", message);
        Ok(())
    }
}
