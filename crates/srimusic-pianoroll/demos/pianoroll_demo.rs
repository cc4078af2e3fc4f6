use std::time::Instant;

use srimusic_pianoroll::PianoRollView;
use srimusic_score::{derive_display_model, PlayheadState, Score};

fn main() -> eframe::Result<()> {
    let mut view = PianoRollView::default();
    view.set_model(derive_display_model(&Score::c_major_scale().events));
    let start = Instant::now();
    eframe::run_simple_native(
        "Piano roll demo",
        eframe::NativeOptions::default(),
        move |ctx, _frame| {
            let total = view.model().total_beats().max(1.0);
            let beat = (start.elapsed().as_secs_f64() * 2.0) % total;
            view.set_playhead(PlayheadState::playing(beat, total));
            egui::CentralPanel::default().show(ctx, |ui| {
                view.show(ui);
            });
            ctx.request_repaint();
        },
    )
}
