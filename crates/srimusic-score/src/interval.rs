use std::borrow::Cow;

use crate::model::Note;

/// Scale notes closer together than this (in beats) are considered adjacent.
pub const ADJACENCY_BEATS: f64 = 1.0;

const INTERVAL_NAMES: [&str; 13] = [
    "P1", "m2", "M2", "m3", "M3", "P4", "TT", "P5", "m6", "M6", "m7", "M7", "P8",
];

const PITCH_CLASS_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Melodic step between two temporally adjacent scale notes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interval {
    pub from_pitch: u8,
    pub to_pitch: u8,
    /// Signed distance, `to_pitch - from_pitch`. Never zero.
    pub semitones: i32,
    pub from_offset: f64,
    pub to_offset: f64,
}

impl Interval {
    /// Returns the interval from `from` to `to` when the notes are adjacent
    /// and not a unison.
    pub fn between(from: &Note, to: &Note) -> Option<Self> {
        if (to.offset - from.offset).abs() >= ADJACENCY_BEATS || from.pitch == to.pitch {
            return None;
        }
        Some(Self {
            from_pitch: from.pitch,
            to_pitch: to.pitch,
            semitones: i32::from(to.pitch) - i32::from(from.pitch),
            from_offset: from.offset,
            to_offset: to.offset,
        })
    }

    pub fn magnitude(&self) -> u32 {
        self.semitones.unsigned_abs()
    }

    pub fn name(&self) -> Cow<'static, str> {
        interval_name(self.magnitude())
    }

    pub fn involves(&self, pitch: u8) -> bool {
        self.from_pitch == pitch || self.to_pitch == pitch
    }

    /// One-line description used by the note detail popup.
    pub fn describe(&self) -> String {
        format!(
            "{} -> {} ({})",
            pitch_name(self.from_pitch),
            pitch_name(self.to_pitch),
            self.name()
        )
    }
}

/// Short interval label for a semitone distance; `"{n}st"` past an octave.
pub fn interval_name(semitones: u32) -> Cow<'static, str> {
    match INTERVAL_NAMES.get(semitones as usize) {
        Some(name) => Cow::Borrowed(name),
        None => Cow::Owned(format!("{semitones}st")),
    }
}

/// Note name with octave, `60 -> "C4"`.
pub fn pitch_name(pitch: u8) -> String {
    let octave = i32::from(pitch / 12) - 1;
    format!("{}{}", PITCH_CLASS_NAMES[usize::from(pitch % 12)], octave)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scale_note(offset: f64, pitch: u8) -> Note {
        Note {
            offset,
            pitch,
            duration: 0.5,
            velocity: 101,
        }
    }

    #[test]
    fn names_follow_table() {
        assert_eq!(interval_name(0), "P1");
        assert_eq!(interval_name(6), "TT");
        assert_eq!(interval_name(7), "P5");
        assert_eq!(interval_name(12), "P8");
        assert_eq!(interval_name(13), "13st");
        assert_eq!(interval_name(24), "24st");
    }

    #[test]
    fn pitch_names() {
        assert_eq!(pitch_name(60), "C4");
        assert_eq!(pitch_name(61), "C#4");
        assert_eq!(pitch_name(0), "C-1");
        assert_eq!(pitch_name(127), "G9");
    }

    #[test]
    fn adjacency_is_strictly_under_one_beat() {
        assert!(Interval::between(&scale_note(0.0, 60), &scale_note(0.99, 62)).is_some());
        assert!(Interval::between(&scale_note(0.0, 60), &scale_note(1.0, 62)).is_none());
    }

    #[test]
    fn unison_is_dropped() {
        assert!(Interval::between(&scale_note(0.0, 60), &scale_note(0.5, 60)).is_none());
    }

    #[test]
    fn descending_interval_keeps_sign() {
        let interval = Interval::between(&scale_note(0.0, 67), &scale_note(0.5, 60)).unwrap();
        assert_eq!(interval.semitones, -7);
        assert_eq!(interval.magnitude(), 7);
        assert_eq!(interval.name(), "P5");
        assert_eq!(interval.describe(), "G4 -> C4 (P5)");
    }
}
