use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context};
use clap::Parser;
use eframe::egui;
use eframe::NativeOptions;
use srimusic_score::{derive_display_model, Score};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app;
mod capabilities;
mod headless;
mod settings;

use app::SriMusicApp;
use capabilities::Capabilities;
use settings::AppSettings;

#[derive(Debug, Parser)]
#[command(author, version, about = "Sri Music visual DAW")]
pub(crate) struct Cli {
    /// JSON score to open
    #[arg(long)]
    score: Option<PathBuf>,

    /// Tempo used when the score does not declare one
    #[arg(long)]
    tempo: Option<f64>,

    /// Horizontal zoom of the piano roll in pixels per beat
    #[arg(long)]
    beat_scale: Option<f32>,

    /// Height of one piano roll row in pixels
    #[arg(long)]
    row_height: Option<f32>,

    /// Playhead update interval in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,

    /// External synthesizer program launched on play
    #[arg(long)]
    synth: Option<PathBuf>,

    /// Argument passed to the synthesizer (repeatable)
    #[arg(long, allow_hyphen_values = true, requires = "synth")]
    synth_arg: Vec<String>,

    /// Never launch the external synthesizer
    #[arg(long, default_value_t = false)]
    silent: bool,

    /// Print a summary of the score instead of opening a window
    #[arg(long, default_value_t = false)]
    headless: bool,

    /// In headless mode, also run the playhead to the end of the score
    #[arg(long, default_value_t = false, requires = "headless")]
    play: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
        .ok();

    let args = Cli::parse();
    let mut settings = settings::load();
    settings.apply_cli(&args);
    let capabilities = Capabilities::detect(&settings, args.silent);
    let source = initial_source(args.score.as_deref(), settings.last_score.as_deref())?;

    if args.headless {
        run_headless(&args, &settings, &capabilities, &source)
    } else {
        run_ui(settings, capabilities, source)
    }
}

/// Editor contents at startup. An explicitly requested score must be
/// readable; a remembered one falls back to the built-in C major scale.
fn initial_source(explicit: Option<&Path>, remembered: Option<&Path>) -> anyhow::Result<String> {
    if let Some(path) = explicit {
        return fs::read_to_string(path)
            .with_context(|| format!("failed to read score {}", path.display()));
    }
    if let Some(path) = remembered {
        match fs::read_to_string(path) {
            Ok(text) => return Ok(text),
            Err(err) => {
                tracing::warn!(?err, path = %path.display(), "could not reopen last score");
            }
        }
    }
    Score::c_major_scale()
        .to_json_pretty()
        .context("failed to encode the default score")
}

fn run_headless(
    args: &Cli,
    settings: &AppSettings,
    capabilities: &Capabilities,
    source: &str,
) -> anyhow::Result<()> {
    let score = Score::from_json(source).context("failed to parse score")?;
    let model = derive_display_model(&score.events);
    let bpm = score.tempo_bpm.unwrap_or(settings.tempo_bpm);
    info!(platform = capabilities.platform, "running headless");
    headless::run(
        &model,
        bpm,
        args.play,
        &capabilities.backend,
        Duration::from_millis(settings.tick_ms),
    )
}

fn run_ui(
    settings: AppSettings,
    capabilities: Capabilities,
    source: String,
) -> anyhow::Result<()> {
    let native_options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_title("Sri Music"),
        ..Default::default()
    };

    eframe::run_native(
        "Sri Music",
        native_options,
        Box::new(move |cc| Box::new(SriMusicApp::new(cc, settings, capabilities, source))),
    )
    .map_err(|err| anyhow!(err.to_string()))
}
