//! Algoscope playback
//!
//! Step-through playback of recorded algorithm runs.
//!
//! # Architecture
//!
//! - **Runner**: Validates a request, synthesizes inputs, produces a stream
//! - **Playback**: Cursor over one stream with play, pause, step and seek
//! - **Display**: Rebuilds what to draw from the initial state and a prefix
//! - **Driver**: Timer task that auto-advances the session
//! - **Server**: REST and WebSocket control surface
//!
//! # Usage
//!
//! ```ignore
//! let state = AppState::new(VisConfig::default());
//! state.run(&request).await?;
//! VisServer::new(state).serve(3000).await?;
//! ```

mod config;
mod display;
mod driver;
mod error;
mod playback;
mod runner;
mod server;

pub use config::{PlaybackConfig, VisConfig, SPEED_PRESETS};
pub use display::{
    reconstruct, ArrayDisplay, DisplayState, GraphDisplay, HashDisplay, HeapDisplay, InitialState, ListDisplay,
    MlDisplay, NodeMark, TreeDisplay,
};
pub use driver::AutoPlayer;
pub use error::{Error, Result};
pub use playback::{PlaybackMode, PlaybackSession, PlaybackStatus, TickOutcome, TickToken};
pub use runner::{build, GraphRequest, GridRequest, MlRequest, Run, RunRequest};
pub use server::{AppState, VisServer};

#[cfg(test)]
mod tests {
    use super::*;
    use algoscope_steps::sorting::SortAlgorithm;

    fn loaded(input: &[i64]) -> PlaybackSession {
        let run = build(&RunRequest::Sorting { algorithm: SortAlgorithm::Insertion, input: input.to_vec() }, 0).unwrap();
        let mut session = PlaybackSession::new(PlaybackConfig::default());
        session.load(run.stream, run.initial);
        session
    }

    #[test]
    fn display_at_end_matches_done() {
        let mut session = loaded(&[4, 2, 3, 1]);
        session.seek(usize::MAX);
        match session.display() {
            Some(DisplayState::Array(array)) => {
                assert_eq!(array.array, vec![1, 2, 3, 4]);
                assert!(array.finished);
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn stepping_matches_reconstruct() {
        let mut session = loaded(&[3, 1, 2]);
        let initial = InitialState::Array { array: vec![3, 1, 2] };
        while session.step() {
            let steps = &session.stream().unwrap().steps()[..session.cursor()];
            assert_eq!(session.display(), Some(&reconstruct(&initial, steps)));
        }
    }
}
