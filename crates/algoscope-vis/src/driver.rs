//! Timer-driven auto-advance.
//!
//! [`AutoPlayer`] owns the shared session and at most one tick task. The task
//! sleeps `speed_ms` (read fresh before every tick), then advances the
//! session with the token it was started with. Pausing, resetting or loading
//! aborts the task, and the session drops any tick whose token has gone
//! stale in the meantime.

use std::sync::Arc;
use std::time::Duration;

use algoscope_steps::StepStream;
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::display::InitialState;
use crate::playback::{PlaybackMode, PlaybackSession, PlaybackStatus, TickOutcome, TickToken};

const UPDATE_CAPACITY: usize = 64;

pub struct AutoPlayer {
    session: Arc<RwLock<PlaybackSession>>,
    task: Mutex<Option<JoinHandle<()>>>,
    updates: broadcast::Sender<PlaybackStatus>,
}

impl AutoPlayer {
    pub fn new(session: PlaybackSession) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CAPACITY);
        Self {
            session: Arc::new(RwLock::new(session)),
            task: Mutex::new(None),
            updates,
        }
    }

    pub fn session(&self) -> &Arc<RwLock<PlaybackSession>> {
        &self.session
    }

    /// Status after every change, including automatic ticks.
    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackStatus> {
        self.updates.subscribe()
    }

    pub async fn status(&self) -> PlaybackStatus {
        PlaybackStatus::from(&*self.session.read().await)
    }

    /// Cancel any running playback, then replace the stream.
    pub async fn load(&self, stream: StepStream, initial: InitialState) -> PlaybackStatus {
        self.cancel().await;
        let mut session = self.session.write().await;
        session.pause();
        session.load(stream, initial);
        self.publish(&session)
    }

    pub async fn play(&self) -> PlaybackStatus {
        let mut session = self.session.write().await;
        if let Some(token) = session.play() {
            self.cancel().await;
            let handle = tokio::spawn(run(self.session.clone(), self.updates.clone(), token));
            *self.task.lock().await = Some(handle);
        }
        self.publish(&session)
    }

    pub async fn pause(&self) -> PlaybackStatus {
        self.control(PlaybackSession::pause).await
    }

    pub async fn reset(&self) -> PlaybackStatus {
        self.control(PlaybackSession::reset).await
    }

    pub async fn step(&self) -> PlaybackStatus {
        self.control(PlaybackSession::step).await
    }

    pub async fn step_backward(&self) -> PlaybackStatus {
        self.control(PlaybackSession::step_backward).await
    }

    pub async fn seek(&self, frame: usize) -> PlaybackStatus {
        self.control(|s| s.seek(frame)).await
    }

    pub async fn set_speed(&self, speed_ms: u64) -> PlaybackStatus {
        self.control(|s| s.set_speed(speed_ms)).await
    }

    /// Apply a manual change; stop the tick task if playback is no longer
    /// running afterwards.
    async fn control<R>(&self, change: impl FnOnce(&mut PlaybackSession) -> R) -> PlaybackStatus {
        let mut session = self.session.write().await;
        change(&mut *session);
        if session.mode() != PlaybackMode::Playing {
            self.cancel().await;
        }
        self.publish(&session)
    }

    async fn cancel(&self) {
        if let Some(handle) = self.task.lock().await.take() {
            handle.abort();
        }
    }

    fn publish(&self, session: &PlaybackSession) -> PlaybackStatus {
        let status = PlaybackStatus::from(session);
        // No subscribers is fine.
        let _ = self.updates.send(status.clone());
        status
    }
}

async fn run(session: Arc<RwLock<PlaybackSession>>, updates: broadcast::Sender<PlaybackStatus>, token: TickToken) {
    loop {
        let delay = session.read().await.speed_ms();
        tokio::time::sleep(Duration::from_millis(delay)).await;

        let mut session = session.write().await;
        let outcome = session.tick(token);
        if outcome == TickOutcome::Stale {
            break;
        }
        let _ = updates.send(PlaybackStatus::from(&*session));
        if outcome == TickOutcome::Finished {
            debug!(generation = token.generation, "auto-advance complete");
            break;
        }
    }
}
