use std::time::{Duration, Instant};

use crossbeam_channel::{tick, unbounded, Receiver};
use srimusic_score::PlayheadState;
use tracing::{debug, info, warn};

use crate::clock::{beats_from_elapsed, DEFAULT_TEMPO_BPM};
use crate::player::Player;
use crate::state::{PlaybackState, PlayerEvent};
use crate::PlaybackError;

/// Interval at which the playhead is resampled while playing.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(50);

/// Everything held for one playback run. The ticker, the event receiver and
/// the player live and die together, so a tick can never be processed
/// after the player has been released.
struct ActiveSession {
    player: Box<dyn Player>,
    events: Receiver<PlayerEvent>,
    ticker: Receiver<Instant>,
    started: Option<Instant>,
}

impl Drop for ActiveSession {
    fn drop(&mut self) {
        debug!(player = self.player.name(), "releasing player");
        self.player.stop();
    }
}

/// Drives playback from the UI thread and produces playhead updates.
pub struct PlaybackDriver {
    state: PlaybackState,
    session: Option<ActiveSession>,
    playhead: PlayheadState,
    tick_interval: Duration,
    total_beats: f64,
    bpm: f64,
    status: Option<String>,
}

impl Default for PlaybackDriver {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL)
    }
}

impl PlaybackDriver {
    pub fn new(tick_interval: Duration) -> Self {
        Self {
            state: PlaybackState::Stopped,
            session: None,
            playhead: PlayheadState::stopped(),
            tick_interval: tick_interval.max(Duration::from_millis(1)),
            total_beats: 0.0,
            bpm: DEFAULT_TEMPO_BPM,
            status: None,
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn playhead(&self) -> PlayheadState {
        self.playhead
    }

    /// Latest user-facing message (finished, failed, ...).
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Starts `player` for a score of `total_beats` at `bpm`. Failures are
    /// also recorded as the status message and leave the driver stopped.
    pub fn play(
        &mut self,
        mut player: Box<dyn Player>,
        total_beats: f64,
        bpm: f64,
    ) -> Result<(), PlaybackError> {
        if self.state.is_active() {
            return Err(PlaybackError::AlreadyActive);
        }
        if !bpm.is_finite() || bpm <= 0.0 {
            return Err(self.fail_start(PlaybackError::InvalidTempo(bpm)));
        }
        if !total_beats.is_finite() || total_beats <= 0.0 {
            return Err(self.fail_start(PlaybackError::EmptyScore));
        }

        let (events_tx, events_rx) = unbounded();
        self.state = PlaybackState::Preparing;
        if let Err(err) = player.start(events_tx) {
            player.stop();
            self.state = PlaybackState::Stopped;
            return Err(self.fail_start(err));
        }
        info!(player = player.name(), total_beats, bpm, "playback preparing");
        self.session = Some(ActiveSession {
            player,
            events: events_rx,
            ticker: tick(self.tick_interval),
            started: None,
        });
        self.total_beats = total_beats;
        self.bpm = bpm;
        self.status = None;
        self.playhead = PlayheadState::stopped();
        Ok(())
    }

    /// Cancels the ticker and releases the player in one step.
    pub fn stop(&mut self) {
        if self.session.take().is_some() {
            info!("playback stopped");
        }
        self.state = PlaybackState::Stopped;
        self.playhead = PlayheadState::stopped();
    }

    pub fn poll(&mut self) -> PlayheadState {
        self.poll_at(Instant::now())
    }

    /// Applies pending player events and, when a tick has elapsed, resamples
    /// the playhead as of `now`.
    pub fn poll_at(&mut self, now: Instant) -> PlayheadState {
        let Some(session) = self.session.as_ref() else {
            return self.playhead;
        };
        let events: Vec<PlayerEvent> = session.events.try_iter().collect();
        for event in events {
            self.apply(event, now);
        }

        if self.state.is_playing() {
            let ticked = self
                .session
                .as_ref()
                .is_some_and(|session| session.ticker.try_iter().count() > 0);
            if ticked {
                self.sample(now);
            }
        }
        self.settle();
        self.playhead
    }

    fn apply(&mut self, event: PlayerEvent, now: Instant) {
        let Some(next) = self.state.on_player_event(&event) else {
            debug!(?event, state = ?self.state, "ignoring player event");
            return;
        };
        if next.is_playing() {
            if let Some(session) = self.session.as_mut() {
                session.started = Some(now);
            }
            self.playhead = PlayheadState::playing(0.0, self.total_beats);
        }
        debug!(from = ?self.state, to = ?next, "playback transition");
        self.state = next;
    }

    fn sample(&mut self, now: Instant) {
        let Some(started) = self.session.as_ref().and_then(|session| session.started) else {
            return;
        };
        let beat = beats_from_elapsed(now.saturating_duration_since(started), self.bpm);
        self.playhead = PlayheadState::playing(beat, self.total_beats);
        if beat >= self.total_beats {
            self.state = PlaybackState::Completed;
        }
    }

    fn settle(&mut self) {
        let Some(next) = self.state.settle() else {
            return;
        };
        self.session = None;
        match &self.state {
            PlaybackState::Completed => {
                info!("playback finished");
                self.playhead = PlayheadState {
                    current_beat: self.total_beats,
                    is_playing: false,
                };
                self.status = Some("Playback finished".to_string());
            }
            PlaybackState::Errored(reason) => {
                warn!(%reason, "playback failed");
                self.playhead.is_playing = false;
                self.status = Some(format!("Playback failed: {reason}"));
            }
            _ => {}
        }
        self.state = next;
    }

    fn fail_start(&mut self, err: PlaybackError) -> PlaybackError {
        warn!(%err, "playback could not start");
        self.status = Some(format!("Playback failed: {err}"));
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::ClockPlayer;

    #[test]
    fn clock_player_runs_to_completion() {
        let mut driver = PlaybackDriver::new(Duration::from_millis(1));
        driver
            .play(Box::new(ClockPlayer), 4.0, 120.0)
            .expect("start");
        assert_eq!(driver.state(), &PlaybackState::Preparing);

        let start = Instant::now();
        let playhead = driver.poll_at(start);
        assert_eq!(driver.state(), &PlaybackState::Playing);
        assert!(playhead.is_playing);
        assert_eq!(playhead.current_beat, 0.0);

        std::thread::sleep(Duration::from_millis(5));
        let playhead = driver.poll_at(start + Duration::from_secs(1));
        assert_eq!(playhead.current_beat, 2.0);

        std::thread::sleep(Duration::from_millis(5));
        let playhead = driver.poll_at(start + Duration::from_secs(3));
        assert_eq!(driver.state(), &PlaybackState::Stopped);
        assert!(!playhead.is_playing);
        assert_eq!(playhead.current_beat, 4.0);
        assert_eq!(driver.status(), Some("Playback finished"));
    }

    #[test]
    fn playhead_waits_for_a_tick() {
        let mut driver = PlaybackDriver::new(Duration::from_secs(3600));
        driver.play(Box::new(ClockPlayer), 4.0, 120.0).unwrap();
        let start = Instant::now();
        driver.poll_at(start);
        let playhead = driver.poll_at(start + Duration::from_secs(1));
        assert_eq!(playhead.current_beat, 0.0);
    }

    #[test]
    fn rejects_invalid_requests() {
        let mut driver = PlaybackDriver::default();
        assert!(matches!(
            driver.play(Box::new(ClockPlayer), 0.0, 120.0),
            Err(PlaybackError::EmptyScore)
        ));
        assert!(matches!(
            driver.play(Box::new(ClockPlayer), 4.0, 0.0),
            Err(PlaybackError::InvalidTempo(_))
        ));
        assert!(driver.status().unwrap().starts_with("Playback failed"));

        driver.play(Box::new(ClockPlayer), 4.0, 120.0).unwrap();
        assert!(matches!(
            driver.play(Box::new(ClockPlayer), 4.0, 120.0),
            Err(PlaybackError::AlreadyActive)
        ));
    }

    #[test]
    fn stop_resets_playhead() {
        let mut driver = PlaybackDriver::new(Duration::from_millis(1));
        driver.play(Box::new(ClockPlayer), 8.0, 120.0).unwrap();
        driver.poll();
        driver.stop();
        assert_eq!(driver.state(), &PlaybackState::Stopped);
        assert_eq!(driver.playhead(), PlayheadState::stopped());
        assert_eq!(driver.poll(), PlayheadState::stopped());
    }
}
