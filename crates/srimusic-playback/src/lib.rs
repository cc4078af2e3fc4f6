//! Playback driver for the piano roll.
//!
//! The driver runs on the UI thread. A backend ([`Player`]) reports its
//! progress as [`PlayerEvent`]s over a channel, a periodic tick samples the
//! clock, and every [`PlaybackDriver::poll`] yields the [`PlayheadState`]
//! the view should show.
//!
//! [`PlayheadState`]: srimusic_score::PlayheadState

pub mod clock;
pub mod driver;
pub mod player;
pub mod state;

use std::io;

use thiserror::Error;

pub use clock::{beats_from_elapsed, seconds_per_beat, DEFAULT_TEMPO_BPM};
pub use driver::{PlaybackDriver, DEFAULT_TICK_INTERVAL};
pub use player::{ClockPlayer, PlaybackBackend, Player, ProcessPlayer, SynthCommand};
pub use state::{PlaybackState, PlayerEvent};

/// Errors produced while starting or running playback.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("playback is already running")]
    AlreadyActive,
    #[error("the score has nothing to play")]
    EmptyScore,
    #[error("invalid tempo {0} bpm")]
    InvalidTempo(f64),
    #[error("failed to launch synthesizer `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to start the synthesizer watcher")]
    Watcher(#[source] io::Error),
}
