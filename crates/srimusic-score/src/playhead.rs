/// Playback position as seen by the piano roll. Only the playback driver writes it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlayheadState {
    pub current_beat: f64,
    pub is_playing: bool,
}

impl PlayheadState {
    pub fn stopped() -> Self {
        Self::default()
    }

    pub fn playing(beat: f64, total_beats: f64) -> Self {
        Self {
            current_beat: clamp_beat(beat, total_beats),
            is_playing: true,
        }
    }

    /// Returns a copy with the beat clamped to `[0, total_beats]`.
    pub fn clamped(self, total_beats: f64) -> Self {
        Self {
            current_beat: clamp_beat(self.current_beat, total_beats),
            ..self
        }
    }
}

/// Clamps `beat` to `[0, total_beats]`; non-finite input maps to zero.
pub fn clamp_beat(beat: f64, total_beats: f64) -> f64 {
    if !beat.is_finite() {
        return 0.0;
    }
    let upper = if total_beats.is_finite() {
        total_beats.max(0.0)
    } else {
        0.0
    };
    beat.clamp(0.0, upper)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beat_is_clamped_to_score_length() {
        assert_eq!(PlayheadState::playing(12.0, 8.0).current_beat, 8.0);
        assert_eq!(PlayheadState::playing(-1.0, 8.0).current_beat, 0.0);
        assert_eq!(PlayheadState::playing(f64::NAN, 8.0).current_beat, 0.0);
        assert_eq!(clamp_beat(3.0, -2.0), 0.0);
    }

    #[test]
    fn clamped_keeps_play_flag() {
        let state = PlayheadState {
            current_beat: 20.0,
            is_playing: false,
        }
        .clamped(4.0);
        assert_eq!(state.current_beat, 4.0);
        assert!(!state.is_playing);
    }
}
