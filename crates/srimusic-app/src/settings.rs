use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use srimusic_playback::{SynthCommand, DEFAULT_TEMPO_BPM};

use crate::Cli;

/// Persisted application settings stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Tempo used when a score does not declare one.
    pub tempo_bpm: f64,
    /// Pixels per beat in the piano roll.
    pub beat_scale: f32,
    pub row_height: f32,
    /// Playhead sampling interval.
    pub tick_ms: u64,
    pub follow_margin: f32,
    /// External synthesizer; silent playback when absent.
    pub synth: Option<SynthCommand>,
    /// Score opened on the previous run.
    pub last_score: Option<PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            tempo_bpm: DEFAULT_TEMPO_BPM,
            beat_scale: 80.0,
            row_height: 22.0,
            tick_ms: 50,
            follow_margin: 50.0,
            synth: None,
            last_score: None,
        }
    }
}

impl AppSettings {
    /// Command line flags win over persisted values.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(tempo) = cli.tempo {
            self.tempo_bpm = tempo;
        }
        if let Some(scale) = cli.beat_scale {
            self.beat_scale = scale;
        }
        if let Some(height) = cli.row_height {
            self.row_height = height;
        }
        if let Some(tick) = cli.tick_ms {
            self.tick_ms = tick;
        }
        if let Some(program) = &cli.synth {
            self.synth = Some(SynthCommand {
                program: program.clone(),
                args: cli.synth_arg.clone(),
            });
        }
        if let Some(score) = &cli.score {
            self.last_score = Some(score.clone());
        }
        self.sanitize();
    }

    fn sanitize(&mut self) {
        let defaults = Self::default();
        if !self.tempo_bpm.is_finite() || self.tempo_bpm <= 0.0 {
            self.tempo_bpm = defaults.tempo_bpm;
        }
        if !self.beat_scale.is_finite() || self.beat_scale <= 0.0 {
            self.beat_scale = defaults.beat_scale;
        }
        if !self.row_height.is_finite() || self.row_height <= 0.0 {
            self.row_height = defaults.row_height;
        }
        self.tick_ms = self.tick_ms.clamp(5, 1000);
        self.follow_margin = self.follow_margin.max(0.0);
    }
}

fn settings_path() -> Option<PathBuf> {
    let mut base = dirs::config_dir()?;
    base.push("SriMusic");
    base.push("settings.json");
    Some(base)
}

/// Load settings from the user config directory. Returns defaults if loading fails.
pub fn load() -> AppSettings {
    match settings_path() {
        Some(path) => load_from(&path),
        None => AppSettings::default(),
    }
}

pub fn load_from(path: &Path) -> AppSettings {
    let mut settings = match fs::read_to_string(path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
            tracing::warn!(?err, path = %path.display(), "ignoring unreadable settings");
            AppSettings::default()
        }),
        Err(_) => AppSettings::default(),
    };
    settings.sanitize();
    settings
}

/// Save settings to the user config directory.
pub fn save(settings: &AppSettings) {
    let Some(path) = settings_path() else {
        return;
    };
    if let Err(err) = save_to(&path, settings) {
        tracing::warn!(?err, "failed to write settings");
    }
}

pub fn save_to(path: &Path, settings: &AppSettings) -> anyhow::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(settings).context("failed to encode settings")?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
