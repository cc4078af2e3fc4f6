use egui::{pos2, vec2, Pos2, Rect, Vec2};
use srimusic_score::{DisplayModel, Note};

/// Scores shorter than this still get a grid this many beats wide.
pub const MIN_CONTENT_BEATS: f64 = 10.0;

/// Pixel geometry of the roll. All coordinates are local to the content
/// area: x grows with time, y grows downwards, and row `i` (the index of
/// its pitch in `visible_pitches`) covers `[row_height * i, row_height * (i + 1))`
/// from the top edge of the grid, so the lowest pitch is the top row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RollLayout {
    /// Pixels per beat.
    pub beat_scale: f32,
    pub row_height: f32,
    /// Extra width appended after the last beat.
    pub padding: f32,
    /// Lower bound for the grid height.
    pub min_height: f32,
    /// Strip under the grid holding beat numbers.
    pub label_band: f32,
}

impl Default for RollLayout {
    fn default() -> Self {
        Self {
            beat_scale: 80.0,
            row_height: 22.0,
            padding: 40.0,
            min_height: 240.0,
            label_band: 18.0,
        }
    }
}

impl RollLayout {
    pub fn beat_to_x(&self, beat: f64) -> f32 {
        beat as f32 * self.beat_scale
    }

    pub fn x_to_beat(&self, x: f32) -> f64 {
        if self.beat_scale <= 0.0 {
            return 0.0;
        }
        f64::from(x / self.beat_scale)
    }

    pub fn grid_height(&self, model: &DisplayModel) -> f32 {
        (model.visible_pitches.len() as f32 * self.row_height).max(self.min_height)
    }

    pub fn content_width(&self, model: &DisplayModel) -> f32 {
        self.beat_to_x(model.total_beats().max(MIN_CONTENT_BEATS)) + self.padding
    }

    /// Total scrollable size, beat labels included.
    pub fn content_size(&self, model: &DisplayModel) -> Vec2 {
        vec2(
            self.content_width(model),
            self.grid_height(model) + self.label_band,
        )
    }

    /// Band of row `row`, spanning `width` pixels.
    pub fn row_rect(&self, row: usize, width: f32) -> Rect {
        let top = row as f32 * self.row_height;
        Rect::from_min_max(pos2(0.0, top), pos2(width, top + self.row_height))
    }

    /// Vertical centre of the row showing `pitch`.
    pub fn pitch_center_y(&self, model: &DisplayModel, pitch: u8) -> Option<f32> {
        let row = model.row_of(pitch)?;
        Some(self.row_rect(row, 0.0).center().y)
    }

    /// Rectangle of `note`, or `None` when its pitch has no row.
    pub fn note_rect(&self, model: &DisplayModel, note: &Note) -> Option<Rect> {
        let row = model.row_of(note.pitch)?;
        let band = self.row_rect(row, 0.0);
        Some(Rect::from_min_max(
            pos2(self.beat_to_x(note.offset), band.top()),
            pos2(self.beat_to_x(note.end()), band.bottom()),
        ))
    }

    /// Index of the first note whose rectangle contains `point`.
    pub fn hit_test(&self, model: &DisplayModel, point: Pos2) -> Option<usize> {
        model.notes.iter().position(|note| {
            self.note_rect(model, note)
                .is_some_and(|rect| contains_half_open(rect, point))
        })
    }
}

fn contains_half_open(rect: Rect, point: Pos2) -> bool {
    point.x >= rect.min.x && point.x < rect.max.x && point.y >= rect.min.y && point.y < rect.max.y
}
