//! Scrollable piano roll for a derived [`DisplayModel`].
//!
//! Geometry ([`layout`]) and playhead following ([`follow`]) are plain
//! functions over egui's math types so they can be exercised without a UI
//! context; [`ui`] does the painting.

pub mod detail;
pub mod follow;
pub mod layout;
pub mod theme;
pub mod ui;
pub mod view;

pub use detail::note_detail;
pub use follow::follow_scroll;
pub use layout::RollLayout;
pub use theme::Theme;
pub use view::PianoRollView;

pub use srimusic_score::{DisplayModel, PlayheadState};
