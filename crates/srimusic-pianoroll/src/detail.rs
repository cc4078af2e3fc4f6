use std::fmt::Write;

use srimusic_score::{pitch_name, DisplayModel, Note};

/// Text shown in the popup for a clicked note. Field order is fixed:
/// pitch, offset, duration, velocity, then the optional drum and interval lines.
pub fn note_detail(model: &DisplayModel, note: &Note) -> String {
    let mut text = format!(
        "Pitch: {} ({})\nOffset: {:.2} beats\nDuration: {:.2} beats\nVelocity: {}",
        pitch_name(note.pitch),
        note.pitch,
        note.offset,
        note.duration,
        note.velocity
    );
    if model.is_drum_pitch(note.pitch) {
        text.push_str("\nDrum: yes");
    }
    if let Some(interval) = model.interval_for_pitch(note.pitch) {
        let _ = write!(text, "\nInterval: {}", interval.describe());
    }
    text
}
