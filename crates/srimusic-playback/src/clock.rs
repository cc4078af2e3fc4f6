use std::time::Duration;

/// Tempo used when neither the score nor the settings provide one.
pub const DEFAULT_TEMPO_BPM: f64 = 120.0;

pub fn seconds_per_beat(bpm: f64) -> f64 {
    60.0 / bpm
}

/// Converts wall-clock time since playback start into a beat position.
/// Non-positive or non-finite tempos yield zero.
pub fn beats_from_elapsed(elapsed: Duration, bpm: f64) -> f64 {
    if !bpm.is_finite() || bpm <= 0.0 {
        return 0.0;
    }
    elapsed.as_secs_f64() / seconds_per_beat(bpm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_seconds_to_beats() {
        assert_eq!(beats_from_elapsed(Duration::from_secs(1), 120.0), 2.0);
        assert_eq!(beats_from_elapsed(Duration::from_millis(1500), 60.0), 1.5);
    }

    #[test]
    fn rejects_bad_tempo() {
        assert_eq!(beats_from_elapsed(Duration::from_secs(1), 0.0), 0.0);
        assert_eq!(beats_from_elapsed(Duration::from_secs(1), f64::NAN), 0.0);
    }
}
