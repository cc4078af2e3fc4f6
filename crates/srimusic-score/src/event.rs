use serde::{Deserialize, Serialize};

use crate::model::{Note, ScoreError};

/// Velocity assumed for events that do not carry one.
pub const DEFAULT_VELOCITY: u8 = 100;

/// Velocity values double as category tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NoteCategory {
    Scale,
    Chord,
    Melody,
    Drum,
    Plain,
}

impl NoteCategory {
    pub const SCALE_VELOCITY: u8 = 101;
    pub const CHORD_VELOCITY: u8 = 102;
    pub const MELODY_VELOCITY: u8 = 103;
    pub const DRUM_VELOCITY: u8 = 104;

    pub fn from_velocity(velocity: u8) -> Self {
        match velocity {
            Self::SCALE_VELOCITY => NoteCategory::Scale,
            Self::CHORD_VELOCITY => NoteCategory::Chord,
            Self::MELODY_VELOCITY => NoteCategory::Melody,
            Self::DRUM_VELOCITY => NoteCategory::Drum,
            _ => NoteCategory::Plain,
        }
    }
}

/// Pitch content of an event: a single note or a chord.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Pitches {
    Single(u8),
    Group(Vec<u8>),
}

impl Pitches {
    pub fn as_slice(&self) -> &[u8] {
        match self {
            Pitches::Single(pitch) => std::slice::from_ref(pitch),
            Pitches::Group(pitches) => pitches,
        }
    }
}

/// One timed event of a composition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreEvent {
    /// Start position in beats.
    pub offset: f64,
    /// Length in beats.
    pub duration: f64,
    pub pitches: Pitches,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity: Option<u8>,
}

impl ScoreEvent {
    pub fn note(offset: f64, duration: f64, pitch: u8, velocity: Option<u8>) -> Self {
        Self {
            offset,
            duration,
            pitches: Pitches::Single(pitch),
            velocity,
        }
    }

    pub fn chord(offset: f64, duration: f64, pitches: Vec<u8>, velocity: Option<u8>) -> Self {
        Self {
            offset,
            duration,
            pitches: Pitches::Group(pitches),
            velocity,
        }
    }

    pub fn velocity(&self) -> u8 {
        self.velocity.unwrap_or(DEFAULT_VELOCITY)
    }

    pub fn category(&self) -> NoteCategory {
        NoteCategory::from_velocity(self.velocity())
    }

    /// Expands the event into one note per pitch.
    pub fn notes(&self) -> impl Iterator<Item = Note> + '_ {
        let velocity = self.velocity();
        self.pitches.as_slice().iter().map(move |&pitch| Note {
            offset: self.offset,
            pitch,
            duration: self.duration,
            velocity,
        })
    }

    pub(crate) fn validate(&self, index: usize) -> Result<(), ScoreError> {
        if !self.offset.is_finite() || self.offset < 0.0 {
            return Err(ScoreError::InvalidOffset {
                index,
                offset: self.offset,
            });
        }
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(ScoreError::InvalidDuration {
                index,
                duration: self.duration,
            });
        }
        if let Some(velocity) = self.velocity {
            if velocity > 127 {
                return Err(ScoreError::VelocityOutOfRange { index, velocity });
            }
        }
        let pitches = self.pitches.as_slice();
        if pitches.is_empty() {
            return Err(ScoreError::EmptyChord { index });
        }
        if let Some(&pitch) = pitches.iter().find(|&&pitch| pitch > 127) {
            return Err(ScoreError::PitchOutOfRange { index, pitch });
        }
        Ok(())
    }
}

/// A composition as produced by running a script: tempo plus a flat event list.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Score {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tempo_bpm: Option<f64>,
    #[serde(default)]
    pub events: Vec<ScoreEvent>,
}

impl Score {
    pub fn from_json(text: &str) -> Result<Self, ScoreError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, ScoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Eight scale notes from C4 to C5, half a beat apart.
    pub fn c_major_scale() -> Self {
        const STEPS: [u8; 8] = [60, 62, 64, 65, 67, 69, 71, 72];
        let events = STEPS
            .iter()
            .enumerate()
            .map(|(index, &pitch)| {
                ScoreEvent::note(
                    index as f64 * 0.5,
                    0.5,
                    pitch,
                    Some(NoteCategory::SCALE_VELOCITY),
                )
            })
            .collect();
        Self {
            tempo_bpm: Some(120.0),
            events,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn velocity_defaults_to_plain() {
        let event = ScoreEvent::note(0.0, 1.0, 60, None);
        assert_eq!(event.velocity(), DEFAULT_VELOCITY);
        assert_eq!(event.category(), NoteCategory::Plain);
    }

    #[test]
    fn category_codes() {
        assert_eq!(NoteCategory::from_velocity(101), NoteCategory::Scale);
        assert_eq!(NoteCategory::from_velocity(102), NoteCategory::Chord);
        assert_eq!(NoteCategory::from_velocity(103), NoteCategory::Melody);
        assert_eq!(NoteCategory::from_velocity(104), NoteCategory::Drum);
        assert_eq!(NoteCategory::from_velocity(105), NoteCategory::Plain);
    }

    #[test]
    fn chord_expands_to_one_note_per_pitch() {
        let event = ScoreEvent::chord(2.0, 1.5, vec![60, 64, 67], Some(102));
        let notes: Vec<_> = event.notes().collect();
        assert_eq!(notes.len(), 3);
        assert!(notes
            .iter()
            .all(|n| n.offset == 2.0 && n.duration == 1.5 && n.velocity == 102));
        assert_eq!(
            notes.iter().map(|n| n.pitch).collect::<Vec<_>>(),
            vec![60, 64, 67]
        );
    }

    #[test]
    fn parses_single_and_group_pitches() {
        let text = r#"{
            "tempo_bpm": 90,
            "events": [
                { "offset": 0, "duration": 1, "pitches": 60, "velocity": 101 },
                { "offset": 1, "duration": 2, "pitches": [48, 52, 55] }
            ]
        }"#;
        let score = Score::from_json(text).expect("parse");
        assert_eq!(score.tempo_bpm, Some(90.0));
        assert_eq!(score.events[0].pitches, Pitches::Single(60));
        assert_eq!(score.events[1].pitches, Pitches::Group(vec![48, 52, 55]));
        assert_eq!(score.events[1].velocity, None);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = Score::from_json("{ \"events\": [ { \"offset\": 0 } ] }").unwrap_err();
        assert!(matches!(err, ScoreError::Parse(_)));
    }
}
