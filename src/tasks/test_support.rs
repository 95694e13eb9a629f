//! Fakes shared by the timer task tests

use async_trait::async_trait;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use crate::{
    errors::{AnnounceError, PlaybackError, StorageError},
    services::{
        Announcer, AudioPlayer, Clip, ClipSet, MemorySessionStorage, SessionStorage, SnapshotStore,
    },
    tasks::{PomodoroTimer, SideEffectDispatcher},
};

pub fn test_clips() -> ClipSet {
    ClipSet {
        work_complete: Some(Clip::new("work-complete", "/sounds/work.wav")),
        break_complete: Some(Clip::new("break-complete", "/sounds/break.wav")),
    }
}

/// Let spawned fire-and-forget tasks run
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

#[derive(Default)]
pub struct RecordingAudio {
    played: Mutex<Vec<String>>,
}

impl RecordingAudio {
    pub fn played(&self) -> Vec<String> {
        self.played.lock().unwrap().clone()
    }
}

#[async_trait]
impl AudioPlayer for RecordingAudio {
    async fn play(&self, clip: &Clip) -> Result<(), PlaybackError> {
        self.played.lock().unwrap().push(clip.name.clone());
        Ok(())
    }
}

/// Behaves like a browser that blocks autoplay
pub struct FailingAudio;

#[async_trait]
impl AudioPlayer for FailingAudio {
    async fn play(&self, _clip: &Clip) -> Result<(), PlaybackError> {
        Err(PlaybackError::PlayerFailed {
            player: "blocked".to_string(),
            code: 1,
        })
    }
}

#[derive(Default)]
pub struct RecordingAnnouncer {
    messages: Mutex<Vec<String>>,
}

impl RecordingAnnouncer {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Announcer for RecordingAnnouncer {
    async fn announce(&self, message: &str) -> Result<(), AnnounceError> {
        self.messages.lock().unwrap().push(message.to_string());
        Ok(())
    }
}

/// Memory storage that counts removals
#[derive(Default)]
pub struct CountingStorage {
    inner: MemorySessionStorage,
    removes: AtomicUsize,
}

impl CountingStorage {
    pub fn removes(&self) -> usize {
        self.removes.load(Ordering::SeqCst)
    }
}

impl SessionStorage for CountingStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.removes.fetch_add(1, Ordering::SeqCst);
        self.inner.remove(key)
    }
}

pub struct Harness {
    pub storage: Arc<CountingStorage>,
    pub audio: Arc<RecordingAudio>,
    pub announcer: Arc<RecordingAnnouncer>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(CountingStorage::default()),
            audio: Arc::new(RecordingAudio::default()),
            announcer: Arc::new(RecordingAnnouncer::default()),
        }
    }

    pub fn store(&self) -> SnapshotStore {
        SnapshotStore::new(self.storage.clone())
    }

    pub fn timer(&self) -> PomodoroTimer {
        let dispatcher =
            SideEffectDispatcher::new(self.audio.clone(), test_clips(), self.announcer.clone());
        PomodoroTimer::restore(self.store(), dispatcher)
    }
}
