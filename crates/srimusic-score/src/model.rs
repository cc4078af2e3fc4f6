use std::collections::BTreeSet;

use thiserror::Error;
use tracing::{debug, warn};

use crate::event::{NoteCategory, ScoreEvent};
use crate::interval::Interval;

/// Errors raised while turning score events into a display model.
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("event {index}: offset {offset} is not a finite, non-negative beat position")]
    InvalidOffset { index: usize, offset: f64 },
    #[error("event {index}: duration {duration} must be finite and positive")]
    InvalidDuration { index: usize, duration: f64 },
    #[error("event {index}: pitch {pitch} is outside the MIDI range")]
    PitchOutOfRange { index: usize, pitch: u8 },
    #[error("event {index}: velocity {velocity} is outside the MIDI range")]
    VelocityOutOfRange { index: usize, velocity: u8 },
    #[error("event {index}: chord has no pitches")]
    EmptyChord { index: usize },
    #[error("failed to parse score: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A single drawable note.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Note {
    pub offset: f64,
    pub pitch: u8,
    pub duration: f64,
    pub velocity: u8,
}

impl Note {
    pub fn end(&self) -> f64 {
        self.offset + self.duration
    }

    pub fn category(&self) -> NoteCategory {
        NoteCategory::from_velocity(self.velocity)
    }
}

/// Display-ready view of a score. Rebuilt wholesale on every run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DisplayModel {
    /// All notes, sorted by pitch (stable with respect to event order).
    pub notes: Vec<Note>,
    /// Sorted, deduplicated pitches tagged as scale degrees.
    pub scale_pitches: Vec<u8>,
    /// Sorted, deduplicated pitches tagged as drums.
    pub drum_pitches: Vec<u8>,
    /// Row set of the piano roll, ascending.
    pub visible_pitches: Vec<u8>,
    pub intervals: Vec<Interval>,
}

impl DisplayModel {
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty() && self.visible_pitches.is_empty()
    }

    /// End of the last note in beats, `0.0` for an empty model.
    pub fn total_beats(&self) -> f64 {
        self.notes.iter().map(Note::end).fold(0.0, f64::max)
    }

    /// Row index of `pitch`, if it is displayed.
    pub fn row_of(&self, pitch: u8) -> Option<usize> {
        self.visible_pitches.binary_search(&pitch).ok()
    }

    pub fn is_drum_pitch(&self, pitch: u8) -> bool {
        self.drum_pitches.binary_search(&pitch).is_ok()
    }

    pub fn is_scale_pitch(&self, pitch: u8) -> bool {
        self.scale_pitches.binary_search(&pitch).is_ok()
    }

    /// First interval that starts or ends on `pitch`.
    pub fn interval_for_pitch(&self, pitch: u8) -> Option<&Interval> {
        self.intervals.iter().find(|interval| interval.involves(pitch))
    }

    pub fn scale_note_count(&self) -> usize {
        self.notes
            .iter()
            .filter(|note| note.category() == NoteCategory::Scale)
            .count()
    }
}

/// Derives the display model, reducing any malformed input to an empty model.
pub fn derive_display_model(events: &[ScoreEvent]) -> DisplayModel {
    match try_derive_display_model(events) {
        Ok(model) => model,
        Err(err) => {
            warn!(%err, "score could not be converted; showing an empty piano roll");
            DisplayModel::default()
        }
    }
}

/// Derives the display model, reporting the first malformed event.
pub fn try_derive_display_model(events: &[ScoreEvent]) -> Result<DisplayModel, ScoreError> {
    for (index, event) in events.iter().enumerate() {
        event.validate(index)?;
    }

    let mut drum_pitches = BTreeSet::new();
    for event in events
        .iter()
        .filter(|event| event.category() == NoteCategory::Drum)
    {
        drum_pitches.extend(event.pitches.as_slice().iter().copied());
    }

    let mut scale_pitches = BTreeSet::new();
    let mut scale_notes = Vec::new();
    for event in events
        .iter()
        .filter(|event| event.category() == NoteCategory::Scale)
    {
        for note in event.notes() {
            scale_pitches.insert(note.pitch);
            scale_notes.push(note);
        }
    }
    // Stable: notes sharing an offset keep their encounter order.
    scale_notes.sort_by(|a, b| a.offset.total_cmp(&b.offset));
    let intervals: Vec<Interval> = scale_notes
        .windows(2)
        .filter_map(|pair| Interval::between(&pair[0], &pair[1]))
        .collect();

    let mut notes: Vec<Note> = events.iter().flat_map(|event| event.notes()).collect();
    let mut visible: BTreeSet<u8> = notes.iter().map(|note| note.pitch).collect();
    visible.extend(scale_pitches.iter().copied());
    visible.extend(drum_pitches.iter().copied());
    notes.sort_by_key(|note| note.pitch);

    debug!(
        notes = notes.len(),
        rows = visible.len(),
        intervals = intervals.len(),
        "derived display model"
    );

    Ok(DisplayModel {
        notes,
        scale_pitches: scale_pitches.into_iter().collect(),
        drum_pitches: drum_pitches.into_iter().collect(),
        visible_pitches: visible.into_iter().collect(),
        intervals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Pitches, Score};

    fn scale(offset: f64, pitch: u8) -> ScoreEvent {
        ScoreEvent::note(offset, 0.5, pitch, Some(NoteCategory::SCALE_VELOCITY))
    }

    #[test]
    fn empty_input_yields_empty_model() {
        let model = derive_display_model(&[]);
        assert!(model.is_empty());
        assert!(model.visible_pitches.is_empty());
        assert!(model.intervals.is_empty());
        assert_eq!(model.total_beats(), 0.0);
    }

    #[test]
    fn adjacency_window_excludes_distant_pairs() {
        let events = [scale(0.0, 60), scale(0.5, 62), scale(1.0, 64), scale(2.5, 65)];
        let model = derive_display_model(&events);
        let pairs: Vec<_> = model
            .intervals
            .iter()
            .map(|i| (i.from_offset, i.to_offset))
            .collect();
        assert_eq!(pairs, vec![(0.0, 0.5), (0.5, 1.0)]);
    }

    #[test]
    fn scale_notes_are_ordered_by_offset_before_pairing() {
        let events = [scale(0.5, 64), scale(0.0, 60), scale(0.25, 62)];
        let model = derive_display_model(&events);
        let chain: Vec<_> = model
            .intervals
            .iter()
            .map(|i| (i.from_pitch, i.to_pitch))
            .collect();
        assert_eq!(chain, vec![(60, 62), (62, 64)]);
    }

    #[test]
    fn scale_and_drum_pitches_join_visible_rows() {
        let events = [
            ScoreEvent::note(0.0, 1.0, 36, Some(NoteCategory::DRUM_VELOCITY)),
            ScoreEvent::chord(1.0, 1.0, vec![48, 55], None),
            scale(2.0, 72),
        ];
        let model = derive_display_model(&events);
        assert_eq!(model.visible_pitches, vec![36, 48, 55, 72]);
        assert_eq!(model.drum_pitches, vec![36]);
        assert_eq!(model.scale_pitches, vec![72]);
        assert!(model.is_drum_pitch(36));
        assert!(!model.is_drum_pitch(48));
        assert_eq!(model.row_of(55), Some(2));
        assert_eq!(model.row_of(60), None);
    }

    #[test]
    fn notes_are_sorted_by_pitch_stably() {
        let events = [
            ScoreEvent::note(3.0, 1.0, 64, None),
            ScoreEvent::note(0.0, 1.0, 60, None),
            ScoreEvent::note(1.0, 1.0, 64, None),
        ];
        let model = derive_display_model(&events);
        let order: Vec<_> = model.notes.iter().map(|n| (n.pitch, n.offset)).collect();
        assert_eq!(order, vec![(60, 0.0), (64, 3.0), (64, 1.0)]);
    }

    #[test]
    fn total_beats_is_end_of_last_note() {
        let events = [
            ScoreEvent::note(0.0, 4.0, 60, None),
            ScoreEvent::note(2.0, 0.5, 62, None),
        ];
        assert_eq!(derive_display_model(&events).total_beats(), 4.0);
    }

    #[test]
    fn malformed_event_clears_the_model() {
        let events = [
            scale(0.0, 60),
            ScoreEvent::note(1.0, 0.0, 62, None),
            scale(2.0, 64),
        ];
        assert!(matches!(
            try_derive_display_model(&events),
            Err(ScoreError::InvalidDuration { index: 1, .. })
        ));
        assert_eq!(derive_display_model(&events), DisplayModel::default());
    }

    #[test]
    fn rejects_out_of_range_values() {
        let high_pitch = [ScoreEvent::note(0.0, 1.0, 128, None)];
        assert!(matches!(
            try_derive_display_model(&high_pitch),
            Err(ScoreError::PitchOutOfRange { pitch: 128, .. })
        ));
        let high_velocity = [ScoreEvent::note(0.0, 1.0, 60, Some(200))];
        assert!(matches!(
            try_derive_display_model(&high_velocity),
            Err(ScoreError::VelocityOutOfRange { velocity: 200, .. })
        ));
        let negative = [ScoreEvent::note(-1.0, 1.0, 60, None)];
        assert!(matches!(
            try_derive_display_model(&negative),
            Err(ScoreError::InvalidOffset { .. })
        ));
        let empty_chord = [ScoreEvent {
            offset: 0.0,
            duration: 1.0,
            pitches: Pitches::Group(Vec::new()),
            velocity: None,
        }];
        assert!(matches!(
            try_derive_display_model(&empty_chord),
            Err(ScoreError::EmptyChord { index: 0 })
        ));
    }

    #[test]
    fn interval_lookup_by_pitch() {
        let model = derive_display_model(&Score::c_major_scale().events);
        let interval = model.interval_for_pitch(64).expect("E4 participates");
        assert_eq!((interval.from_pitch, interval.to_pitch), (62, 64));
        assert!(model.interval_for_pitch(30).is_none());
    }
}
