/// Lifecycle of one playback run:
/// `Stopped -> Preparing -> Playing -> (Completed | Errored) -> Stopped`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Preparing,
    Playing,
    Completed,
    Errored(String),
}

/// Progress reported by a player backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlayerEvent {
    Prepared,
    Completed,
    Errored(String),
}

impl PlaybackState {
    pub fn is_playing(&self) -> bool {
        matches!(self, PlaybackState::Playing)
    }

    /// Preparing or playing: a player resource is held.
    pub fn is_active(&self) -> bool {
        matches!(self, PlaybackState::Preparing | PlaybackState::Playing)
    }

    /// Next state after `event`, or `None` when the event does not apply
    /// in the current state.
    pub fn on_player_event(&self, event: &PlayerEvent) -> Option<PlaybackState> {
        match (self, event) {
            (PlaybackState::Preparing, PlayerEvent::Prepared) => Some(PlaybackState::Playing),
            (PlaybackState::Playing, PlayerEvent::Completed) => Some(PlaybackState::Completed),
            (PlaybackState::Preparing | PlaybackState::Playing, PlayerEvent::Errored(reason)) => {
                Some(PlaybackState::Errored(reason.clone()))
            }
            _ => None,
        }
    }

    /// Terminal states fall back to `Stopped` once observed.
    pub fn settle(&self) -> Option<PlaybackState> {
        match self {
            PlaybackState::Completed | PlaybackState::Errored(_) => Some(PlaybackState::Stopped),
            _ => None,
        }
    }
}
