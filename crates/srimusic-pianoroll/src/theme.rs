use egui::{Color32, Stroke};
use srimusic_score::{DisplayModel, Note, NoteCategory};

/// Visual design tokens used by the piano roll renderer.
#[derive(Clone, Debug)]
pub struct Theme {
    pub background: Color32,
    pub row_white: Color32,
    pub row_black: Color32,
    pub scale_highlight: Color32,
    pub grid_beat: Stroke,
    pub grid_bar: Stroke,
    pub row_divider: Stroke,
    pub text: Color32,
    pub label: Color32,
    pub note_drum: Color32,
    pub note_scale: Color32,
    pub note_chord: Color32,
    pub note_melody: Color32,
    /// Plain notes blend from `note_soft` (velocity 0) to `note_loud` (127).
    pub note_soft: Color32,
    pub note_loud: Color32,
    pub note_border: Stroke,
    pub note_opacity: f32,
    pub selected_opacity: f32,
    pub selected_border: Stroke,
    pub interval: Stroke,
    pub interval_text: Color32,
    pub playhead: Stroke,
}

impl Theme {
    /// Returns the default dark theme.
    pub fn dark() -> Self {
        Self {
            background: Color32::from_rgb(20, 21, 24),
            row_white: Color32::from_rgb(38, 40, 45),
            row_black: Color32::from_rgb(28, 29, 33),
            scale_highlight: Color32::from_rgba_unmultiplied(120, 170, 250, 40),
            grid_beat: Stroke::new(1.0, Color32::from_rgb(50, 52, 58)),
            grid_bar: Stroke::new(2.0, Color32::from_rgb(70, 73, 80)),
            row_divider: Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 62, 68, 120)),
            text: Color32::from_rgb(210, 214, 220),
            label: Color32::from_rgb(160, 162, 170),
            note_drum: Color32::from_rgb(235, 90, 80),
            note_scale: Color32::from_rgb(90, 200, 120),
            note_chord: Color32::from_rgb(170, 120, 240),
            note_melody: Color32::from_rgb(250, 190, 60),
            note_soft: Color32::from_rgb(40, 80, 120),
            note_loud: Color32::from_rgb(80, 180, 250),
            note_border: Stroke::new(1.0, Color32::from_rgba_unmultiplied(255, 255, 255, 60)),
            note_opacity: 0.7,
            selected_opacity: 1.0,
            selected_border: Stroke::new(2.0, Color32::WHITE),
            interval: Stroke::new(1.5, Color32::from_rgb(255, 220, 120)),
            interval_text: Color32::from_rgb(255, 230, 160),
            playhead: Stroke::new(2.0, Color32::from_rgb(255, 120, 60)),
        }
    }

    /// Colour of `note`: drums first, then the velocity category, then a
    /// velocity blend for plain notes.
    pub fn note_color(&self, model: &DisplayModel, note: &Note, selected: bool) -> Color32 {
        let base = if model.is_drum_pitch(note.pitch) {
            self.note_drum
        } else {
            match note.category() {
                NoteCategory::Scale => self.note_scale,
                NoteCategory::Chord => self.note_chord,
                NoteCategory::Melody => self.note_melody,
                NoteCategory::Drum | NoteCategory::Plain => {
                    lerp_color(self.note_soft, self.note_loud, f32::from(note.velocity) / 127.0)
                }
            }
        };
        let opacity = if selected {
            self.selected_opacity
        } else {
            self.note_opacity
        };
        base.gamma_multiply(opacity)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

fn lerp_color(from: Color32, to: Color32, t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (f32::from(a) + (f32::from(b) - f32::from(a)) * t).round() as u8;
    Color32::from_rgb(mix(from.r(), to.r()), mix(from.g(), to.g()), mix(from.b(), to.b()))
}
