use std::fs;
use std::time::Duration;

use eframe::egui::{self, FontData, FontDefinitions, FontFamily, RichText};
use eframe::{App, CreationContext};
use srimusic_pianoroll::{PianoRollView, RollLayout, Theme};
use srimusic_playback::PlaybackDriver;
use srimusic_score::{try_derive_display_model, DisplayModel, Score};
use tracing::{info, warn};

use crate::capabilities::Capabilities;
use crate::settings::{self, AppSettings};

const FALLBACK_FONT: &str = "srimusic-fallback";

/// Score editor, piano roll and transport in one window.
pub struct SriMusicApp {
    source: String,
    view: PianoRollView,
    driver: PlaybackDriver,
    capabilities: Capabilities,
    settings: AppSettings,
    /// Tempo of the last successfully run score.
    tempo_bpm: f64,
    status: String,
    last_driver_status: Option<String>,
    persist_settings: bool,
}

impl SriMusicApp {
    pub fn new(
        cc: &CreationContext<'_>,
        settings: AppSettings,
        capabilities: Capabilities,
        source: String,
    ) -> Self {
        install_fallback_font(&cc.egui_ctx, &capabilities);
        let mut app = Self::without_window(settings, capabilities, source);
        app.persist_settings = true;
        app.run_score();
        app
    }

    /// Application state without a window, used by `new` and by tests.
    pub(crate) fn without_window(
        settings: AppSettings,
        capabilities: Capabilities,
        source: String,
    ) -> Self {
        let layout = RollLayout {
            beat_scale: settings.beat_scale,
            row_height: settings.row_height,
            ..RollLayout::default()
        };
        let view = PianoRollView::new(layout, Theme::dark()).with_follow_margin(settings.follow_margin);
        let driver = PlaybackDriver::new(Duration::from_millis(settings.tick_ms));
        Self {
            source,
            view,
            driver,
            tempo_bpm: settings.tempo_bpm,
            status: format!("Ready ({})", capabilities.backend.describe()),
            capabilities,
            settings,
            last_driver_status: None,
            persist_settings: false,
        }
    }

    /// Parses the editor contents and replaces the piano roll model. Any
    /// running playback is stopped first.
    pub fn run_score(&mut self) {
        self.driver.stop();
        match Score::from_json(&self.source)
            .and_then(|score| try_derive_display_model(&score.events).map(|model| (score, model)))
        {
            Ok((score, model)) => {
                self.tempo_bpm = score.tempo_bpm.unwrap_or(self.settings.tempo_bpm);
                self.status = format!(
                    "{} notes, {} intervals, {:.2} beats at {:.0} BPM",
                    model.notes.len(),
                    model.intervals.len(),
                    model.total_beats(),
                    self.tempo_bpm
                );
                info!(notes = model.notes.len(), bpm = self.tempo_bpm, "score run");
                self.view.set_model(model);
            }
            Err(err) => {
                warn!(%err, "score rejected");
                self.status = format!("Score error: {err}");
                self.view.set_model(DisplayModel::default());
            }
        }
    }

    pub fn play(&mut self) {
        if self.driver.state().is_active() {
            return;
        }
        let total = self.view.model().total_beats();
        let player = self.capabilities.backend.create_player();
        match self.driver.play(player, total, self.tempo_bpm) {
            Ok(()) => {
                self.status = format!("Playing at {:.0} BPM", self.tempo_bpm);
                self.last_driver_status = None;
            }
            Err(err) => self.status = format!("Playback failed: {err}"),
        }
    }

    pub fn stop(&mut self) {
        self.driver.stop();
        self.view.set_playhead(self.driver.playhead());
        self.status = "Stopped".to_string();
    }

    /// Pulls the latest playhead and status from the driver into the view.
    fn sync_playback(&mut self) {
        let playhead = self.driver.poll();
        if playhead != self.view.playhead() {
            self.view.set_playhead(playhead);
        }
        let driver_status = self.driver.status().map(str::to_owned);
        if driver_status.is_some() && driver_status != self.last_driver_status {
            if let Some(status) = &driver_status {
                self.status = status.clone();
            }
            self.last_driver_status = driver_status;
        }
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("Run").clicked() {
                self.run_score();
            }
            let active = self.driver.state().is_active();
            let can_play = !active && !self.view.model().is_empty();
            if ui.add_enabled(can_play, egui::Button::new("Play")).clicked() {
                self.play();
            }
            if ui.add_enabled(active, egui::Button::new("Stop")).clicked() {
                self.stop();
            }
            ui.separator();
            ui.label(format!("{:.0} BPM", self.tempo_bpm));
            ui.label(format!("beat {:.2}", self.view.playhead().current_beat));
        });
    }
}

impl App for SriMusicApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.sync_playback();
        if self.driver.state().is_active() {
            ctx.request_repaint_after(self.driver.tick_interval());
        }

        egui::TopBottomPanel::top("transport").show(ctx, |ui| self.toolbar(ui));
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.label(RichText::new(&self.status).small());
        });
        egui::SidePanel::left("score_editor")
            .resizable(true)
            .default_width(360.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    ui.add(
                        egui::TextEdit::multiline(&mut self.source)
                            .code_editor()
                            .desired_width(f32::INFINITY)
                            .desired_rows(32),
                    );
                });
            });
        egui::CentralPanel::default().show(ctx, |ui| {
            self.view.show(ui);
        });
    }
}

impl Drop for SriMusicApp {
    fn drop(&mut self) {
        self.driver.stop();
        if self.persist_settings {
            settings::save(&self.settings);
        }
    }
}

/// Appends the detected font to both families so glyphs missing from the
/// bundled fonts still render.
fn install_fallback_font(ctx: &egui::Context, capabilities: &Capabilities) {
    let Some(path) = capabilities.fallback_font.as_ref() else {
        return;
    };
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(?err, path = %path.display(), "failed to read fallback font");
            return;
        }
    };
    let mut fonts = FontDefinitions::default();
    fonts
        .font_data
        .insert(FALLBACK_FONT.to_owned(), FontData::from_owned(bytes));
    for family in [FontFamily::Monospace, FontFamily::Proportional] {
        fonts
            .families
            .entry(family)
            .or_default()
            .push(FALLBACK_FONT.to_owned());
    }
    ctx.set_fonts(fonts);
}
