use egui::Pos2;
use srimusic_score::playhead::clamp_beat;
use srimusic_score::{DisplayModel, PlayheadState};
use tracing::debug;

use crate::detail::note_detail;
use crate::follow::{follow_scroll, DEFAULT_FOLLOW_MARGIN};
use crate::layout::RollLayout;
use crate::theme::Theme;

/// Stateful piano roll widget. Owns the display model it draws; the
/// playhead is pushed in by the playback driver.
#[derive(Clone, Debug)]
pub struct PianoRollView {
    pub(crate) model: DisplayModel,
    pub(crate) playhead: PlayheadState,
    pub(crate) selected: Option<usize>,
    pub(crate) layout: RollLayout,
    pub(crate) theme: Theme,
    pub(crate) follow_margin: f32,
    /// Horizontal scroll offset observed on the last frame.
    pub(crate) scroll_x: f32,
    /// Offset to apply on the next frame.
    pub(crate) pending_scroll: Option<f32>,
    pub(crate) viewport_width: f32,
    pub(crate) detail: Option<String>,
}

impl Default for PianoRollView {
    fn default() -> Self {
        Self::new(RollLayout::default(), Theme::default())
    }
}

impl PianoRollView {
    pub fn new(layout: RollLayout, theme: Theme) -> Self {
        Self {
            model: DisplayModel::default(),
            playhead: PlayheadState::stopped(),
            selected: None,
            layout,
            theme,
            follow_margin: DEFAULT_FOLLOW_MARGIN,
            scroll_x: 0.0,
            pending_scroll: None,
            viewport_width: 0.0,
            detail: None,
        }
    }

    pub fn with_follow_margin(mut self, margin: f32) -> Self {
        self.follow_margin = margin.max(0.0);
        self
    }

    /// Replaces the model wholesale. Selection, popup, playhead and scroll
    /// position are reset.
    pub fn set_model(&mut self, model: DisplayModel) {
        debug!(
            notes = model.notes.len(),
            rows = model.visible_pitches.len(),
            "piano roll model replaced"
        );
        self.model = model;
        self.selected = None;
        self.detail = None;
        self.playhead = PlayheadState::stopped();
        self.scroll_x = 0.0;
        self.pending_scroll = Some(0.0);
    }

    pub fn model(&self) -> &DisplayModel {
        &self.model
    }

    pub fn layout(&self) -> &RollLayout {
        &self.layout
    }

    pub fn playhead(&self) -> PlayheadState {
        self.playhead
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
    }

    pub fn scroll_x(&self) -> f32 {
        self.scroll_x
    }

    /// Records the viewport geometry measured by the scroll area.
    pub fn set_viewport(&mut self, width: f32, scroll_x: f32) {
        self.viewport_width = width.max(0.0);
        self.scroll_x = scroll_x.max(0.0);
    }

    /// Accepts a playhead update from the playback driver. Scrolling only
    /// follows a playing playhead.
    pub fn set_playhead(&mut self, playhead: PlayheadState) {
        if playhead.is_playing && !self.playhead.is_playing {
            self.detail = None;
            self.selected = None;
        }
        self.playhead.is_playing = playhead.is_playing;
        if playhead.is_playing {
            self.advance_to(playhead.current_beat);
        } else {
            self.playhead.current_beat = clamp_beat(playhead.current_beat, self.model.total_beats());
        }
    }

    /// Moves the playhead to `beat` (clamped to the score) and, when it comes
    /// within the follow margin of a viewport edge, schedules a scroll that
    /// recentres it. Returns the new scroll offset if one was scheduled.
    pub fn advance_to(&mut self, beat: f64) -> Option<f32> {
        let beat = clamp_beat(beat, self.model.total_beats());
        self.playhead.current_beat = beat;
        let next = follow_scroll(
            self.layout.beat_to_x(beat),
            self.scroll_x,
            self.viewport_width,
            self.layout.content_width(&self.model),
            self.follow_margin,
        )?;
        self.scroll_x = next;
        self.pending_scroll = Some(next);
        Some(next)
    }

    /// Selects the note under `point` (content coordinates) and opens its
    /// detail popup. Ignored while playing.
    pub fn select_note_at(&mut self, point: Pos2) -> Option<usize> {
        if self.playhead.is_playing {
            return None;
        }
        self.selected = self.layout.hit_test(&self.model, point);
        self.detail = self
            .selected
            .and_then(|index| self.model.notes.get(index))
            .map(|note| note_detail(&self.model, note));
        self.selected
    }
}
