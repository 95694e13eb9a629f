//! Side effects of phase completion: sound, notification, announcement

use std::{sync::Arc, time::Duration};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::{
    services::{Announcer, AudioPlayer, ClipSet},
    state::{Action, Phase, TimerState},
};

/// How long a phase-completion notification stays up
pub const NOTIFICATION_DISMISS_DELAY: Duration = Duration::from_millis(5000);

/// Notification text shown after `completed` ends
pub fn completion_message(completed: Phase) -> &'static str {
    match completed {
        Phase::Work => "Great work! Take a break. ☕",
        Phase::Break => "Break time is over! Time to focus. 🍅",
    }
}

/// Phrase announced remotely after `completed` ends
pub fn completion_phrase(completed: Phase) -> &'static str {
    match completed {
        Phase::Work => "time for a break",
        Phase::Break => "back to work",
    }
}

/// The single pending auto-dismiss deadline
#[derive(Debug, Default)]
pub struct NotificationTimer {
    deadline: Option<Instant>,
}

impl NotificationTimer {
    /// Arm for `delay` from now, replacing any pending deadline
    pub fn arm(&mut self, delay: Duration) {
        if self.deadline.is_some() {
            debug!("Replacing pending notification dismiss timer");
        }
        self.deadline = Some(Instant::now() + delay);
    }

    /// Cancel the pending deadline. Returns whether one was armed.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|at| at <= Instant::now())
    }
}

/// Reacts to completed phases and owns the notification
pub struct SideEffectDispatcher {
    audio: Arc<dyn AudioPlayer>,
    clips: ClipSet,
    announcer: Arc<dyn Announcer>,
    notification: Option<&'static str>,
    dismiss_timer: NotificationTimer,
}

impl SideEffectDispatcher {
    pub fn new(audio: Arc<dyn AudioPlayer>, clips: ClipSet, announcer: Arc<dyn Announcer>) -> Self {
        Self {
            audio,
            clips,
            announcer,
            notification: None,
            dismiss_timer: NotificationTimer::default(),
        }
    }

    /// Inspect a new state and return the follow-up action, if any.
    ///
    /// A reconciled transition only gets its flag cleared. A live countdown
    /// that hit zero gets sound, notification and announcement, then moves on.
    pub fn react(&mut self, state: &TimerState) -> Option<Action> {
        if state.transition_suppressed {
            debug!("Consuming reconciled {} transition silently", state.phase.as_str());
            return Some(Action::ClearTransitionFlag);
        }

        if !state.is_phase_complete() {
            return None;
        }

        let completed = state.phase;
        info!(
            "{} phase complete, moving to {} phase",
            completed.as_str(),
            completed.next().as_str()
        );
        self.play_completion_sound(completed);
        self.show_notification(completion_message(completed));
        self.announce(completion_phrase(completed));
        Some(Action::TransitionPhase)
    }

    /// Show `message` and (re)arm the auto-dismiss timer
    pub fn show_notification(&mut self, message: &'static str) {
        self.notification = Some(message);
        self.dismiss_timer.arm(NOTIFICATION_DISMISS_DELAY);
    }

    /// Hide the notification now. Safe to call when nothing is shown.
    pub fn dismiss_notification(&mut self) {
        let was_armed = self.dismiss_timer.cancel();
        if self.notification.take().is_some() || was_armed {
            debug!("Notification dismissed");
        }
    }

    /// Hide the notification if its dismiss deadline has passed
    pub fn expire_notification(&mut self) {
        if self.dismiss_timer.is_expired() {
            self.dismiss_timer.cancel();
            self.notification = None;
            debug!("Notification auto-dismissed");
        }
    }

    pub fn notification(&self) -> Option<&'static str> {
        self.notification
    }

    pub fn dismiss_deadline(&self) -> Option<Instant> {
        self.dismiss_timer.deadline()
    }

    /// Fire-and-forget remote announcement
    pub fn announce(&self, phrase: &'static str) {
        let announcer = Arc::clone(&self.announcer);
        tokio::spawn(async move {
            if let Err(e) = announcer.announce(phrase).await {
                warn!("Failed to announce \"{}\": {}", phrase, e);
            }
        });
    }

    fn play_completion_sound(&self, completed: Phase) {
        let Some(clip) = self.clips.for_completed(completed).cloned() else {
            debug!("No clip configured for {} completion", completed.as_str());
            return;
        };
        let audio = Arc::clone(&self.audio);
        tokio::spawn(async move {
            if let Err(e) = audio.play(&clip).await {
                warn!("Failed to play {} clip: {}", clip.name, e);
            }
        });
    }
}
