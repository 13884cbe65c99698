//! Playback controls for a buffered step stream.
//!
//! ```text
//! Idle --load--> Ready --play--> Playing --pause--> Paused --play--> Playing
//! Playing --cursor == len--> Finished
//! reset: any loaded state --> Ready, cursor 0
//! ```
//!
//! Every transition that ends or supersedes an auto-advance run bumps the
//! session generation. Scheduled ticks carry the generation they were issued
//! for and are discarded once it has moved on.

use algoscope_steps::{Step, StepStream};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::PlaybackConfig;
use crate::display::{reconstruct, DisplayState, InitialState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackMode {
    /// No stream loaded
    Idle,
    /// Stream loaded, cursor at 0
    Ready,
    Playing,
    Paused,
    /// Cursor at the end of the stream
    Finished,
}

/// Identity of one scheduled auto-advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickToken {
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Advanced,
    /// Advanced onto the last step; no further ticks are needed.
    Finished,
    /// Issued for a superseded generation or a session that is no longer
    /// playing. Nothing changed.
    Stale,
}

struct Loaded {
    stream: StepStream,
    initial: InitialState,
}

/// Cursor, mode and speed over one stream.
pub struct PlaybackSession {
    loaded: Option<Loaded>,
    display: Option<DisplayState>,
    cursor: usize,
    mode: PlaybackMode,
    speed_ms: u64,
    config: PlaybackConfig,
    generation: u64,
}

impl PlaybackSession {
    pub fn new(config: PlaybackConfig) -> Self {
        Self {
            loaded: None,
            display: None,
            cursor: 0,
            mode: PlaybackMode::Idle,
            speed_ms: config.clamp_speed(config.speed_ms),
            config,
            generation: 0,
        }
    }

    /// Replace the stream. Any pending tick is invalidated and the cursor
    /// returns to 0.
    pub fn load(&mut self, stream: StepStream, initial: InitialState) {
        self.generation += 1;
        debug!(steps = stream.len(), generation = self.generation, "stream loaded");
        self.loaded = Some(Loaded { stream, initial });
        self.cursor = 0;
        self.mode = PlaybackMode::Ready;
        self.refresh();
    }

    /// Start auto-advance. Returns the token the first tick must carry, or
    /// `None` when nothing is loaded or playback is already running. Playing
    /// from the end starts over.
    pub fn play(&mut self) -> Option<TickToken> {
        let len = self.total_steps();
        if self.loaded.is_none() || self.mode == PlaybackMode::Playing {
            return None;
        }
        if self.cursor >= len {
            self.cursor = 0;
            self.refresh();
        }
        self.generation += 1;
        self.mode = PlaybackMode::Playing;
        debug!(cursor = self.cursor, generation = self.generation, "playing");
        Some(self.token())
    }

    /// Stop auto-advance. Returns whether playback was running.
    pub fn pause(&mut self) -> bool {
        if self.mode != PlaybackMode::Playing {
            return false;
        }
        self.generation += 1;
        self.mode = PlaybackMode::Paused;
        debug!(cursor = self.cursor, "paused");
        true
    }

    pub fn reset(&mut self) {
        if self.loaded.is_none() {
            return;
        }
        self.generation += 1;
        self.cursor = 0;
        self.mode = PlaybackMode::Ready;
        self.refresh();
    }

    /// Advance by exactly one step. A running playback is paused first.
    /// Returns whether the cursor moved.
    pub fn step(&mut self) -> bool {
        match self.mode {
            PlaybackMode::Idle | PlaybackMode::Finished => false,
            PlaybackMode::Playing => {
                self.pause();
                self.advance()
            }
            PlaybackMode::Ready | PlaybackMode::Paused => self.advance(),
        }
    }

    /// Move back one step and pause.
    pub fn step_backward(&mut self) -> bool {
        if self.loaded.is_none() || self.cursor == 0 {
            return false;
        }
        if self.mode == PlaybackMode::Playing {
            self.generation += 1;
        }
        self.cursor -= 1;
        self.mode = PlaybackMode::Paused;
        self.refresh();
        true
    }

    /// Jump to `frame`, clamped to `[0, len]`. Playback keeps running unless
    /// the jump lands on the end.
    pub fn seek(&mut self, frame: usize) {
        if self.loaded.is_none() {
            return;
        }
        let len = self.total_steps();
        self.cursor = frame.min(len);
        if self.cursor == len {
            if self.mode == PlaybackMode::Playing {
                self.generation += 1;
            }
            self.mode = PlaybackMode::Finished;
        } else if self.mode != PlaybackMode::Playing {
            self.mode = if self.cursor == 0 { PlaybackMode::Ready } else { PlaybackMode::Paused };
        }
        self.refresh();
    }

    /// Takes effect from the next scheduled tick.
    pub fn set_speed(&mut self, speed_ms: u64) {
        self.speed_ms = self.config.clamp_speed(speed_ms);
    }

    /// Auto-advance one step on behalf of `token`.
    pub fn tick(&mut self, token: TickToken) -> TickOutcome {
        if token.generation != self.generation || self.mode != PlaybackMode::Playing {
            debug!(
                token = token.generation,
                current = self.generation,
                "discarding stale tick"
            );
            return TickOutcome::Stale;
        }
        self.cursor = (self.cursor + 1).min(self.total_steps());
        self.refresh();
        if self.cursor >= self.total_steps() {
            self.mode = PlaybackMode::Finished;
            debug!("finished");
            TickOutcome::Finished
        } else {
            TickOutcome::Advanced
        }
    }

    fn advance(&mut self) -> bool {
        let len = self.total_steps();
        if self.cursor >= len {
            return false;
        }
        self.cursor += 1;
        self.mode = if self.cursor == len { PlaybackMode::Finished } else { PlaybackMode::Paused };
        self.refresh();
        true
    }

    fn refresh(&mut self) {
        self.display = self
            .loaded
            .as_ref()
            .map(|l| reconstruct(&l.initial, l.stream.prefix(self.cursor)));
    }

    pub fn token(&self) -> TickToken {
        TickToken { generation: self.generation }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn total_steps(&self) -> usize {
        self.loaded.as_ref().map_or(0, |l| l.stream.len())
    }

    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    pub fn speed_ms(&self) -> u64 {
        self.speed_ms
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn stream(&self) -> Option<&StepStream> {
        self.loaded.as_ref().map(|l| &l.stream)
    }

    /// The most recently applied step.
    pub fn current_step(&self) -> Option<&Step> {
        let stream = self.stream()?;
        stream.get(self.cursor.checked_sub(1)?)
    }

    /// Display at the cursor; `None` while idle.
    pub fn display(&self) -> Option<&DisplayState> {
        self.display.as_ref()
    }

    /// Fraction of the stream played, 0.0 to 1.0.
    pub fn progress(&self) -> f64 {
        let len = self.total_steps();
        if len == 0 {
            0.0
        } else {
            self.cursor as f64 / len as f64
        }
    }
}

/// Playback status for sending to the frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackStatus {
    pub cursor: usize,
    pub total_steps: usize,
    pub mode: PlaybackMode,
    pub speed_ms: u64,
    pub progress: f64,
    pub generation: u64,
    pub current_step: Option<Step>,
}

impl From<&PlaybackSession> for PlaybackStatus {
    fn from(session: &PlaybackSession) -> Self {
        Self {
            cursor: session.cursor,
            total_steps: session.total_steps(),
            mode: session.mode,
            speed_ms: session.speed_ms,
            progress: session.progress(),
            generation: session.generation,
            current_step: session.current_step().cloned(),
        }
    }
}
