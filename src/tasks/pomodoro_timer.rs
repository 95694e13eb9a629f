//! Pomodoro timer background task
//!
//! One task owns the timer state, the one-second tick source and the
//! notification deadline. Requests, ticks and dismiss deadlines are handled
//! one at a time by a single select loop.

use std::{future::pending, time::Duration};
use tokio::{
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
    time::{interval_at, sleep_until, Instant, Interval},
};
use tracing::{debug, info, warn};

use super::dispatcher::SideEffectDispatcher;
use crate::{
    errors::TimerError,
    services::{SnapshotStore, PAUSE_PHRASE, START_PHRASE},
    state::{reconcile, reduce, Action, TimerState, TimerView},
    utils::now_millis,
};

/// Period of the tick source
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

const REQUEST_QUEUE: usize = 32;

/// User-facing timer actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    Start,
    Pause,
    Reset,
    SkipToNextPhase,
    DismissNotification,
}

impl TimerCommand {
    pub fn name(self) -> &'static str {
        match self {
            TimerCommand::Start => "start",
            TimerCommand::Pause => "pause",
            TimerCommand::Reset => "reset",
            TimerCommand::SkipToNextPhase => "skip",
            TimerCommand::DismissNotification => "dismiss-notification",
        }
    }
}

/// A command plus where to send the resulting view
#[derive(Debug)]
pub struct TimerRequest {
    pub command: TimerCommand,
    pub reply: Option<oneshot::Sender<TimerView>>,
}

/// The timer task's state
pub struct PomodoroTimer {
    state: TimerState,
    ticker: Option<Interval>,
    store: SnapshotStore,
    dispatcher: SideEffectDispatcher,
    view_tx: watch::Sender<TimerView>,
}

impl PomodoroTimer {
    /// Build the timer from whatever snapshot survived the last run
    pub fn restore(store: SnapshotStore, dispatcher: SideEffectDispatcher) -> Self {
        let snapshot = store.load();
        let state = reconcile(snapshot.as_ref(), now_millis());
        info!(
            "Timer restored: {} {} {}s{}",
            state.phase.as_str(),
            state.run_state.as_str(),
            state.time_remaining,
            if state.transition_suppressed { " (phase completed while away)" } else { "" }
        );

        let (view_tx, _) = watch::channel(TimerView::new(&state, None));
        let mut timer = Self {
            state,
            ticker: None,
            store,
            dispatcher,
            view_tx,
        };
        timer.observe(None);
        timer
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn view(&self) -> TimerView {
        TimerView::new(&self.state, self.dispatcher.notification())
    }

    pub fn subscribe(&self) -> watch::Receiver<TimerView> {
        self.view_tx.subscribe()
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_some()
    }

    /// Apply a user command and return the resulting view
    pub fn handle(&mut self, command: TimerCommand) -> TimerView {
        debug!("Timer command: {}", command.name());
        match command {
            TimerCommand::Start => {
                if self.apply(Action::Start) {
                    self.dispatcher.announce(START_PHRASE);
                }
            }
            TimerCommand::Pause => {
                if self.apply(Action::Pause) {
                    self.dispatcher.announce(PAUSE_PHRASE);
                }
            }
            TimerCommand::Reset => {
                self.dispatcher.dismiss_notification();
                self.apply(Action::Reset);
            }
            TimerCommand::SkipToNextPhase => {
                self.apply(Action::SkipToNextPhase);
            }
            TimerCommand::DismissNotification => {
                self.dispatcher.dismiss_notification();
            }
        }
        self.publish();
        self.view()
    }

    /// Run `action` through the reducer. Returns whether the state changed.
    pub fn apply(&mut self, action: Action) -> bool {
        let previous = self.state;
        self.state = reduce(&previous, action);
        if self.state == previous {
            return false;
        }
        self.observe(Some(previous));
        true
    }

    /// Keep the tick source, the snapshot and the side effects in step with
    /// the new state
    fn observe(&mut self, previous: Option<TimerState>) {
        let was_running = previous.is_some_and(|p| p.is_running());
        if self.state.is_running() {
            if !was_running {
                self.arm_ticker();
            }
        } else {
            self.disarm_ticker();
        }

        if self.state.is_idle() {
            self.store.clear();
        } else {
            self.store.save(&self.state, now_millis());
        }

        if let Some(follow_up) = self.dispatcher.react(&self.state) {
            self.apply(follow_up);
        }
        self.publish();
    }

    fn arm_ticker(&mut self) {
        // Replacing the interval drops the previous one.
        self.ticker = Some(interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL));
        debug!("Tick source armed");
    }

    fn disarm_ticker(&mut self) {
        if self.ticker.take().is_some() {
            debug!("Tick source disarmed");
        }
    }

    fn publish(&self) {
        self.view_tx.send_replace(self.view());
    }

    /// Serve requests until every handle is dropped
    pub async fn run(mut self, mut requests: mpsc::Receiver<TimerRequest>) {
        info!("Starting pomodoro timer task");

        loop {
            let dismiss_at = self.dispatcher.dismiss_deadline();

            tokio::select! {
                request = requests.recv() => {
                    let Some(request) = request else {
                        info!("All timer handles dropped, stopping timer task");
                        break;
                    };
                    let view = self.handle(request.command);
                    if let Some(reply) = request.reply {
                        if reply.send(view).is_err() {
                            debug!("Requester went away before the reply");
                        }
                    }
                }

                _ = next_tick(&mut self.ticker) => {
                    self.apply(Action::Tick);
                }

                _ = wait_until(dismiss_at) => {
                    self.dispatcher.expire_notification();
                    self.publish();
                }
            }
        }

        self.disarm_ticker();
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => pending::<()>().await,
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => pending::<()>().await,
    }
}

/// Cloneable handle for talking to the timer task
#[derive(Debug, Clone)]
pub struct TimerHandle {
    requests: mpsc::Sender<TimerRequest>,
    view_rx: watch::Receiver<TimerView>,
}

impl TimerHandle {
    /// Send `command` and wait for the resulting view
    pub async fn send(&self, command: TimerCommand) -> Result<TimerView, TimerError> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(TimerRequest {
                command,
                reply: Some(reply),
            })
            .await
            .map_err(|_| TimerError::Unavailable)?;
        response.await.map_err(|_| TimerError::Unavailable)
    }

    pub async fn start(&self) -> Result<TimerView, TimerError> {
        self.send(TimerCommand::Start).await
    }

    pub async fn pause(&self) -> Result<TimerView, TimerError> {
        self.send(TimerCommand::Pause).await
    }

    pub async fn reset(&self) -> Result<TimerView, TimerError> {
        self.send(TimerCommand::Reset).await
    }

    pub async fn skip_to_next_phase(&self) -> Result<TimerView, TimerError> {
        self.send(TimerCommand::SkipToNextPhase).await
    }

    pub async fn dismiss_notification(&self) -> Result<TimerView, TimerError> {
        self.send(TimerCommand::DismissNotification).await
    }

    /// Latest published view
    pub fn view(&self) -> TimerView {
        self.view_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TimerView> {
        self.view_rx.clone()
    }
}

/// Spawn the timer task and return a handle to it
pub fn spawn_timer(timer: PomodoroTimer) -> (TimerHandle, JoinHandle<()>) {
    let (requests, rx) = mpsc::channel(REQUEST_QUEUE);
    let view_rx = timer.subscribe();
    let task = tokio::spawn(async move {
        timer.run(rx).await;
        warn!("Pomodoro timer task exited");
    });
    (TimerHandle { requests, view_rx }, task)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::SessionStorage;
    use crate::state::{Phase, PersistedSnapshot, RunState, BREAK_SECONDS, WORK_SECONDS};
    use crate::tasks::dispatcher::completion_message;
    use crate::tasks::test_support::{settle, Harness};
    use tokio::time::sleep;

    fn assert_persistence_matches(harness: &Harness, timer: &PomodoroTimer) {
        let stored = harness.store().load();
        assert_eq!(timer.state().is_idle(), stored.is_none());
    }

    #[tokio::test]
    async fn start_pause_and_announcements() {
        let harness = Harness::new();
        let mut timer = harness.timer();
        assert_eq!(*timer.state(), TimerState::idle());
        assert!(!timer.is_ticking());

        let view = timer.handle(TimerCommand::Start);
        assert_eq!(view.state, RunState::Running);
        assert_eq!(view.time_remaining, WORK_SECONDS);
        assert!(timer.is_ticking());
        assert_persistence_matches(&harness, &timer);

        timer.handle(TimerCommand::Start);
        timer.handle(TimerCommand::Pause);
        assert!(!timer.is_ticking());
        assert_persistence_matches(&harness, &timer);

        settle().await;
        assert_eq!(
            harness.announcer.messages(),
            vec![START_PHRASE.to_string(), PAUSE_PHRASE.to_string()]
        );
    }

    #[tokio::test]
    async fn full_work_phase_rolls_into_break() {
        let harness = Harness::new();
        let mut timer = harness.timer();

        timer.handle(TimerCommand::Start);
        for _ in 0..WORK_SECONDS {
            timer.apply(Action::Tick);
            assert!(!timer.state().is_phase_complete());
        }

        let state = *timer.state();
        assert_eq!(state.phase, Phase::Break);
        assert_eq!(state.run_state, RunState::Running);
        assert_eq!(state.time_remaining, BREAK_SECONDS);
        assert!(timer.is_ticking());

        let view = timer.view();
        assert!(view.show_notification);
        assert_eq!(
            view.notification_message.as_deref(),
            Some(completion_message(Phase::Work))
        );

        settle().await;
        assert_eq!(harness.audio.played(), vec!["work-complete".to_string()]);
        assert_persistence_matches(&harness, &timer);
    }

    #[tokio::test]
    async fn reset_clears_persistence_once() {
        let harness = Harness::new();
        let mut timer = harness.timer();
        timer.handle(TimerCommand::Start);
        timer.apply(Action::Tick);
        assert!(harness.store().load().is_some());

        let before = harness.storage.removes();
        let view = timer.handle(TimerCommand::Reset);
        assert_eq!(harness.storage.removes() - before, 1);
        assert_eq!(*timer.state(), TimerState::idle());
        assert!(!view.show_notification);
        assert!(!timer.is_ticking());
        assert_persistence_matches(&harness, &timer);
    }

    #[tokio::test]
    async fn skip_while_idle_changes_nothing() {
        let harness = Harness::new();
        let mut timer = harness.timer();
        timer.handle(TimerCommand::SkipToNextPhase);
        assert_eq!(*timer.state(), TimerState::idle());
        assert!(harness.store().load().is_none());
    }

    #[tokio::test]
    async fn skip_while_paused_resumes_next_phase_silently() {
        let harness = Harness::new();
        let mut timer = harness.timer();
        timer.handle(TimerCommand::Start);
        timer.handle(TimerCommand::Pause);

        timer.handle(TimerCommand::SkipToNextPhase);
        assert_eq!(*timer.state(), TimerState::entering(Phase::Break, false));
        assert!(timer.is_ticking());

        settle().await;
        assert!(harness.audio.played().is_empty());
    }

    #[tokio::test]
    async fn reload_after_expiry_resumes_next_phase_without_effects() {
        let harness = Harness::new();
        let snapshot = PersistedSnapshot {
            phase: Phase::Work,
            state: RunState::Running,
            time_remaining: 10,
            last_updated: now_millis() - 15_000,
        };
        harness
            .storage
            .set(
                crate::services::SNAPSHOT_KEY,
                &serde_json::to_string(&snapshot).unwrap(),
            )
            .unwrap();

        let timer = harness.timer();
        let state = *timer.state();
        assert_eq!(state.phase, Phase::Break);
        assert_eq!(state.time_remaining, BREAK_SECONDS);
        assert!(!state.transition_suppressed);
        assert!(timer.is_ticking());
        assert!(!timer.view().show_notification);

        settle().await;
        assert!(harness.audio.played().is_empty());
        assert!(harness.announcer.messages().is_empty());

        let stored = harness.store().load().unwrap();
        assert_eq!(stored.phase, Phase::Break);
    }

    #[tokio::test]
    async fn reload_while_paused_keeps_time() {
        let harness = Harness::new();
        let snapshot = PersistedSnapshot {
            phase: Phase::Break,
            state: RunState::Paused,
            time_remaining: 100,
            last_updated: now_millis() - 600_000,
        };
        harness
            .storage
            .set(
                crate::services::SNAPSHOT_KEY,
                &serde_json::to_string(&snapshot).unwrap(),
            )
            .unwrap();

        let timer = harness.timer();
        assert_eq!(timer.state().run_state, RunState::Paused);
        assert_eq!(timer.state().time_remaining, 100);
        assert!(!timer.is_ticking());
    }

    #[tokio::test]
    async fn invalid_snapshot_is_removed_on_restore() {
        let harness = Harness::new();
        harness
            .storage
            .set(crate::services::SNAPSHOT_KEY, "{\"phase\":\"nap\"}")
            .unwrap();

        let timer = harness.timer();
        assert_eq!(*timer.state(), TimerState::idle());
        assert!(harness.storage.get(crate::services::SNAPSHOT_KEY).unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn tick_source_only_runs_while_running() {
        let harness = Harness::new();
        let (handle, _task) = spawn_timer(harness.timer());

        handle.start().await.unwrap();
        sleep(Duration::from_millis(10_500)).await;
        assert_eq!(handle.view().time_remaining, WORK_SECONDS - 10);

        handle.pause().await.unwrap();
        sleep(Duration::from_secs(100)).await;
        assert_eq!(handle.view().time_remaining, WORK_SECONDS - 10);

        handle.start().await.unwrap();
        sleep(Duration::from_millis(5_500)).await;
        assert_eq!(handle.view().time_remaining, WORK_SECONDS - 15);

        handle.reset().await.unwrap();
        sleep(Duration::from_secs(30)).await;
        assert_eq!(handle.view().time_remaining, WORK_SECONDS);
        assert_eq!(handle.view().state, RunState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn live_completion_notification_auto_dismisses() {
        let harness = Harness::new();
        let (handle, _task) = spawn_timer(harness.timer());

        handle.start().await.unwrap();
        sleep(Duration::from_millis(u64::from(WORK_SECONDS) * 1000 + 500)).await;

        let view = handle.view();
        assert_eq!(view.phase, Phase::Break);
        assert_eq!(view.state, RunState::Running);
        assert_eq!(view.time_remaining, BREAK_SECONDS);
        assert!(view.show_notification);
        assert_eq!(harness.audio.played(), vec!["work-complete".to_string()]);

        sleep(Duration::from_secs(5)).await;
        let view = handle.view();
        assert!(!view.show_notification);
        assert_eq!(view.time_remaining, BREAK_SECONDS - 5);
    }

    #[tokio::test(start_paused = true)]
    async fn manual_dismiss_hides_notification_immediately() {
        let harness = Harness::new();
        let (handle, _task) = spawn_timer(harness.timer());

        handle.start().await.unwrap();
        sleep(Duration::from_millis(u64::from(WORK_SECONDS) * 1000 + 500)).await;
        assert!(handle.view().show_notification);

        let view = handle.dismiss_notification().await.unwrap();
        assert!(!view.show_notification);
        let view = handle.dismiss_notification().await.unwrap();
        assert!(!view.show_notification);
    }

    #[tokio::test]
    async fn handle_reports_unavailable_after_task_stops() {
        let harness = Harness::new();
        let (handle, task) = spawn_timer(harness.timer());
        task.abort();
        let _ = task.await;
        assert!(matches!(handle.start().await, Err(TimerError::Unavailable)));
    }
}
