use std::borrow::Cow;
use std::ops::RangeInclusive;

use egui::{Color32, Rangef};
use srimusic_score::DisplayModel;

use crate::layout::RollLayout;
use crate::theme::Theme;

pub mod pianoroll;

/// Beats between numbered grid labels.
pub const BEATS_PER_LABEL: u64 = 4;

/// Horizontal distance from the source note's left edge to its interval connector.
pub const CONNECTOR_INSET: f32 = 6.0;

pub fn is_black_key(pitch: u8) -> bool {
    matches!(pitch % 12, 1 | 3 | 6 | 8 | 10)
}

pub fn row_color(theme: &Theme, pitch: u8) -> Color32 {
    if is_black_key(pitch) {
        theme.row_black
    } else {
        theme.row_white
    }
}

/// Vertical interval marker in content coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Connector {
    pub x: f32,
    pub from_y: f32,
    pub to_y: f32,
    pub label: Cow<'static, str>,
}

/// One connector per interval whose pitches both have a row.
pub fn connector_segments(model: &DisplayModel, layout: &RollLayout) -> Vec<Connector> {
    model
        .intervals
        .iter()
        .filter_map(|interval| {
            Some(Connector {
                x: layout.beat_to_x(interval.from_offset) + CONNECTOR_INSET,
                from_y: layout.pitch_center_y(model, interval.from_pitch)?,
                to_y: layout.pitch_center_y(model, interval.to_pitch)?,
                label: interval.name(),
            })
        })
        .collect()
}

/// Part of `[0, width]` covered by `clip`, both in content coordinates.
/// A non-finite clip falls back to the whole width.
pub fn visible_span(clip: Rangef, width: f32) -> Rangef {
    let width = width.max(0.0);
    let min = if clip.min.is_finite() { clip.min.clamp(0.0, width) } else { 0.0 };
    let max = if clip.max.is_finite() { clip.max.clamp(min, width) } else { width };
    Rangef::new(min, max)
}

/// Whole beats whose grid lines fall inside `span`. Empty for a degenerate scale.
pub fn visible_beats(span: Rangef, beat_scale: f32) -> RangeInclusive<u64> {
    if beat_scale.is_nan() || beat_scale <= 0.0 || !span.min.is_finite() || !span.max.is_finite() {
        return RangeInclusive::new(1, 0);
    }
    let first = (span.min.max(0.0) / beat_scale).ceil() as u64;
    let last = (span.max.max(0.0) / beat_scale).floor() as u64;
    first..=last
}

#[cfg(test)]
mod tests {
    use super::*;
    use srimusic_score::{derive_display_model, Score, ScoreEvent};

    fn layout() -> RollLayout {
        RollLayout {
            beat_scale: 100.0,
            row_height: 20.0,
            padding: 0.0,
            min_height: 0.0,
            label_band: 0.0,
        }
    }

    #[test]
    fn black_keys_by_pitch_class() {
        let black: Vec<u8> = (60..72).filter(|&p| is_black_key(p)).collect();
        assert_eq!(black, vec![61, 63, 66, 68, 70]);
    }

    #[test]
    fn connectors_sit_inside_the_source_note() {
        let model = derive_display_model(&Score::c_major_scale().events);
        let connectors = connector_segments(&model, &layout());
        assert_eq!(connectors.len(), 7);
        let first = &connectors[0];
        assert_eq!(first.x, CONNECTOR_INSET);
        // C4 is row 0, D4 row 1.
        assert_eq!((first.from_y, first.to_y), (10.0, 30.0));
        assert_eq!(first.label, "M2");
        assert_eq!(connectors[2].x, 100.0 + CONNECTOR_INSET);
        assert_eq!(connectors[2].label, "m2");
    }

    #[test]
    fn connectors_need_both_rows() {
        let mut model = derive_display_model(&[
            ScoreEvent::note(0.0, 0.5, 60, Some(101)),
            ScoreEvent::note(0.5, 0.5, 67, Some(101)),
        ]);
        assert_eq!(connector_segments(&model, &layout()).len(), 1);
        model.visible_pitches.retain(|&pitch| pitch != 67);
        assert!(connector_segments(&model, &layout()).is_empty());
    }

    #[test]
    fn span_is_clamped_to_content() {
        let span = visible_span(Rangef::new(-50.0, 5000.0), 1200.0);
        assert_eq!((span.min, span.max), (0.0, 1200.0));
        let span = visible_span(Rangef::new(300.0, 700.0), 1200.0);
        assert_eq!((span.min, span.max), (300.0, 700.0));
        let span = visible_span(Rangef::new(f32::NEG_INFINITY, f32::INFINITY), 1200.0);
        assert_eq!((span.min, span.max), (0.0, 1200.0));
    }

    #[test]
    fn only_beats_in_view_are_listed() {
        assert_eq!(visible_beats(Rangef::new(250.0, 700.0), 100.0), 3..=7);
        assert_eq!(visible_beats(Rangef::new(0.0, 100.0), 100.0), 0..=1);
        let far = visible_beats(Rangef::new(1.6e8, 1.6e8 + 800.0), 80.0);
        assert!(far.end() - far.start() <= 11);
        assert!(visible_beats(Rangef::new(0.0, 100.0), 0.0).is_empty());
    }
}
