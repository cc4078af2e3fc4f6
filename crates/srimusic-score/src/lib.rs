//! Score model adapter for the Sri Music piano roll.
//!
//! A [`Score`] is a flat list of timed note and chord events. The adapter in
//! [`model`] flattens it into a [`DisplayModel`]: notes sorted for drawing,
//! the set of rows to show, and the melodic intervals between adjacent
//! scale notes.

pub mod event;
pub mod interval;
pub mod model;
pub mod playhead;

pub use event::{NoteCategory, Pitches, Score, ScoreEvent, DEFAULT_VELOCITY};
pub use interval::{interval_name, pitch_name, Interval};
pub use model::{derive_display_model, try_derive_display_model, DisplayModel, Note, ScoreError};
pub use playhead::PlayheadState;
