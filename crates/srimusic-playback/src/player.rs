use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::Sender;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::state::PlayerEvent;
use crate::PlaybackError;

const WATCH_INTERVAL: Duration = Duration::from_millis(20);

/// A playback backend. `start` must report progress through `events`;
/// `stop` releases whatever the player holds and may be called repeatedly.
pub trait Player {
    fn name(&self) -> &'static str;
    fn start(&mut self, events: Sender<PlayerEvent>) -> Result<(), PlaybackError>;
    fn stop(&mut self);
}

/// Silent backend: only the playhead clock runs.
#[derive(Debug, Default)]
pub struct ClockPlayer;

impl Player for ClockPlayer {
    fn name(&self) -> &'static str {
        "clock"
    }

    fn start(&mut self, events: Sender<PlayerEvent>) -> Result<(), PlaybackError> {
        let _ = events.send(PlayerEvent::Prepared);
        Ok(())
    }

    fn stop(&mut self) {}
}

/// External synthesizer invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthCommand {
    pub program: PathBuf,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Runs an external synthesizer process for the duration of playback.
pub struct ProcessPlayer {
    command: SynthCommand,
    child: Arc<Mutex<Option<Child>>>,
    running: Arc<AtomicBool>,
    watcher: Option<JoinHandle<()>>,
}

impl ProcessPlayer {
    pub fn new(command: SynthCommand) -> Self {
        Self {
            command,
            child: Arc::new(Mutex::new(None)),
            running: Arc::new(AtomicBool::new(false)),
            watcher: None,
        }
    }
}

impl Player for ProcessPlayer {
    fn name(&self) -> &'static str {
        "external-synth"
    }

    fn start(&mut self, events: Sender<PlayerEvent>) -> Result<(), PlaybackError> {
        self.stop();
        let program = self.command.program.display().to_string();
        let child = Command::new(&self.command.program)
            .args(&self.command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| PlaybackError::Spawn {
                program: program.clone(),
                source,
            })?;
        debug!(%program, pid = child.id(), "synthesizer launched");
        *self.child.lock() = Some(child);
        self.running.store(true, Ordering::Release);
        let _ = events.send(PlayerEvent::Prepared);

        let child = self.child.clone();
        let running = self.running.clone();
        let handle = thread::Builder::new()
            .name("srimusic-synth-watch".into())
            .spawn(move || watch_child(&child, &running, &events))
            .map_err(|err| {
                self.stop();
                PlaybackError::Watcher(err)
            })?;
        self.watcher = Some(handle);
        Ok(())
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(mut child) = self.child.lock().take() {
            if let Err(err) = child.kill() {
                debug!(?err, "synthesizer already exited");
            }
            let _ = child.wait();
        }
        if let Some(handle) = self.watcher.take() {
            if let Err(err) = handle.join() {
                error!(?err, "failed to join synthesizer watcher");
            }
        }
    }
}

impl Drop for ProcessPlayer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn watch_child(child: &Mutex<Option<Child>>, running: &AtomicBool, events: &Sender<PlayerEvent>) {
    while running.load(Ordering::Acquire) {
        let outcome = {
            let mut guard = child.lock();
            let Some(process) = guard.as_mut() else {
                return;
            };
            match process.try_wait() {
                Ok(Some(status)) => {
                    guard.take();
                    Some(if status.success() {
                        PlayerEvent::Completed
                    } else {
                        PlayerEvent::Errored(format!("synthesizer exited with {status}"))
                    })
                }
                Ok(None) => None,
                Err(err) => {
                    warn!(?err, "failed to poll synthesizer");
                    Some(PlayerEvent::Errored(err.to_string()))
                }
            }
        };
        if let Some(event) = outcome {
            let _ = events.send(event);
            return;
        }
        thread::sleep(WATCH_INTERVAL);
    }
}

/// Backend chosen at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackBackend {
    Silent,
    ExternalSynth(SynthCommand),
}

impl PlaybackBackend {
    pub fn create_player(&self) -> Box<dyn Player> {
        match self {
            PlaybackBackend::Silent => Box::new(ClockPlayer),
            PlaybackBackend::ExternalSynth(command) => Box::new(ProcessPlayer::new(command.clone())),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            PlaybackBackend::Silent => "silent clock".to_string(),
            PlaybackBackend::ExternalSynth(command) => {
                format!("external synth ({})", command.program.display())
            }
        }
    }
}
