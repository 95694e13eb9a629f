//! Focus Timer - A reload-safe work/break interval timer
//!
//! This is the main entry point for the focus-timer server.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use focus_timer::{
    api::create_router,
    config::Config,
    services::{
        Announcer, AudioPlayer, ClipSet, CommandAudioPlayer, FileSessionStorage,
        MemorySessionStorage, NoopAnnouncer, SessionStorage, SilentAudioPlayer, SnapshotStore,
        SonosAnnouncer,
    },
    state::AppState,
    tasks::{spawn_timer, PomodoroTimer, SideEffectDispatcher},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("focus_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting focus-timer server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}", config.host, config.port);

    let storage = open_storage(&config);
    let (audio, clips) = build_audio(&config);
    let announcer = build_announcer(&config);

    let dispatcher = SideEffectDispatcher::new(audio, clips, announcer);
    let timer = PomodoroTimer::restore(SnapshotStore::new(storage), dispatcher);
    let (handle, timer_task) = spawn_timer(timer);

    let state = Arc::new(AppState::new(handle, config.port, config.host.clone()));
    let app = create_router(state);

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /pomodoro                      - Current timer state");
    info!("  POST /pomodoro/start                - Start or resume");
    info!("  POST /pomodoro/pause                - Pause");
    info!("  POST /pomodoro/reset                - Reset to idle");
    info!("  POST /pomodoro/skip                 - Skip to the next phase");
    info!("  POST /pomodoro/notification/dismiss - Hide the notification");
    info!("  GET  /status                        - Timer plus server status");
    info!("  GET  /health                        - Health check");

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    timer_task.abort();
    info!("Server shutdown complete");
    Ok(())
}

/// Session storage, or memory storage if the session directory is unusable
fn open_storage(config: &Config) -> Arc<dyn SessionStorage> {
    let dir = config.session_dir();
    match FileSessionStorage::open(&dir) {
        Ok(storage) => {
            info!("Persisting timer state in {}", storage.dir().display());
            Arc::new(storage)
        }
        Err(e) => {
            warn!("Session storage unavailable, timer will not survive restarts: {}", e);
            Arc::new(MemorySessionStorage::new())
        }
    }
}

fn build_audio(config: &Config) -> (Arc<dyn AudioPlayer>, ClipSet) {
    if config.work_sound.is_none() && config.break_sound.is_none() {
        info!("No sounds configured, phase completion will be silent");
        return (Arc::new(SilentAudioPlayer), ClipSet::default());
    }

    let player = CommandAudioPlayer::new(config.player.clone());
    let cache = |name: &str, path: &Option<std::path::PathBuf>| {
        let path = path.as_ref()?;
        match player.cache(name, path) {
            Ok(clip) => Some(clip),
            Err(e) => {
                warn!("Skipping {} sound: {}", name, e);
                None
            }
        }
    };
    let clips = ClipSet {
        work_complete: cache("work-complete", &config.work_sound),
        break_complete: cache("break-complete", &config.break_sound),
    };
    (Arc::new(player), clips)
}

fn build_announcer(config: &Config) -> Arc<dyn Announcer> {
    match &config.announce_url {
        Some(url) => {
            info!("Announcing on speaker '{}' via {} at volume {}", config.speaker, url, config.volume);
            Arc::new(SonosAnnouncer::new(url.clone(), config.speaker.clone(), config.volume))
        }
        None => {
            info!("No announce URL configured, announcements disabled");
            Arc::new(NoopAnnouncer)
        }
    }
}
