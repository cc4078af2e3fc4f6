use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use srimusic_playback::{PlaybackBackend, SynthCommand};
use tracing::{info, warn};

use crate::settings::AppSettings;

#[cfg(target_os = "linux")]
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/noto/NotoSansMono-Regular.ttf",
    "/usr/share/fonts/noto/NotoSansMono-Regular.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
];

#[cfg(target_os = "macos")]
const FONT_CANDIDATES: &[&str] = &[
    "/System/Library/Fonts/Menlo.ttc",
    "/System/Library/Fonts/Supplemental/Courier New.ttf",
];

#[cfg(target_os = "windows")]
const FONT_CANDIDATES: &[&str] = &["C:\\Windows\\Fonts\\consola.ttf", "C:\\Windows\\Fonts\\cour.ttf"];

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
const FONT_CANDIDATES: &[&str] = &[];

/// What the host offers, probed once at startup and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct Capabilities {
    pub platform: &'static str,
    pub backend: PlaybackBackend,
    /// Monospace font for the score editor, when one is installed.
    pub fallback_font: Option<PathBuf>,
}

impl Capabilities {
    pub fn detect(settings: &AppSettings, force_silent: bool) -> Self {
        Self::detect_with(
            settings,
            force_silent,
            env::var_os("PATH"),
            FONT_CANDIDATES,
            |path: &Path| path.is_file(),
        )
    }

    pub fn detect_with(
        settings: &AppSettings,
        force_silent: bool,
        search_path: Option<OsString>,
        font_candidates: &[&str],
        exists: impl Fn(&Path) -> bool,
    ) -> Self {
        let backend = match (&settings.synth, force_silent) {
            (Some(command), false) => {
                match resolve_program(&command.program, search_path.as_deref(), &exists) {
                    Some(program) => PlaybackBackend::ExternalSynth(SynthCommand {
                        program,
                        args: command.args.clone(),
                    }),
                    None => {
                        warn!(
                            program = %command.program.display(),
                            "synthesizer not found; falling back to silent playback"
                        );
                        PlaybackBackend::Silent
                    }
                }
            }
            _ => PlaybackBackend::Silent,
        };

        let fallback_font = font_candidates
            .iter()
            .map(PathBuf::from)
            .find(|candidate| exists(candidate.as_path()));

        let capabilities = Self {
            platform: env::consts::OS,
            backend,
            fallback_font,
        };
        info!(
            platform = capabilities.platform,
            backend = %capabilities.backend.describe(),
            font = ?capabilities.fallback_font,
            "capabilities detected"
        );
        capabilities
    }
}

/// Bare names are looked up on the search path; anything with a directory
/// component must exist as given.
fn resolve_program(
    program: &Path,
    search_path: Option<&std::ffi::OsStr>,
    exists: &impl Fn(&Path) -> bool,
) -> Option<PathBuf> {
    if program.components().count() > 1 || program.is_absolute() {
        return exists(program).then(|| program.to_path_buf());
    }
    let search_path = search_path?;
    env::split_paths(search_path)
        .map(|dir| dir.join(program))
        .find(|candidate| exists(candidate.as_path()))
}
