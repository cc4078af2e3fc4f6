use egui::{self, pos2, vec2, Align2, FontId, Painter, Pos2, Rangef, Rect, Response, Sense, Ui};
use srimusic_score::{pitch_name, DisplayModel};

use super::{connector_segments, row_color, visible_beats, visible_span, BEATS_PER_LABEL};
use crate::layout::RollLayout;
use crate::theme::Theme;
use crate::view::PianoRollView;

/// Room right of a connector for its label.
const LABEL_SLACK: f32 = 40.0;

struct RollCtx<'a> {
    painter: &'a Painter,
    origin: Pos2,
    /// Visible part of the content, in content x coordinates.
    span: Rangef,
    grid_height: f32,
    model: &'a DisplayModel,
    layout: &'a RollLayout,
    theme: &'a Theme,
}

impl RollCtx<'_> {
    fn to_screen(&self, rect: Rect) -> Rect {
        rect.translate(self.origin.to_vec2())
    }

    fn vertical(&self, x: f32, bottom: f32, stroke: egui::Stroke) {
        self.painter.line_segment(
            [
                pos2(self.origin.x + x, self.origin.y),
                pos2(self.origin.x + x, self.origin.y + bottom),
            ],
            stroke,
        );
    }
}

impl PianoRollView {
    /// Draws the roll inside a two-way scroll area and handles note clicks.
    pub fn show(&mut self, ui: &mut Ui) -> Response {
        let content = self.layout.content_size(&self.model);
        let mut area = egui::ScrollArea::both()
            .id_source("srimusic_pianoroll")
            .auto_shrink([false; 2]);
        if let Some(offset) = self.pending_scroll.take() {
            area = area.horizontal_scroll_offset(offset);
        }

        let view = &*self;
        let output = area.show(ui, |ui| {
            let (response, painter) = ui.allocate_painter(content, Sense::click());
            let origin = response.rect.min;
            let clip = painter.clip_rect().x_range();
            let ctx = RollCtx {
                painter: &painter,
                origin,
                span: visible_span(
                    Rangef::new(clip.min - origin.x, clip.max - origin.x),
                    content.x,
                ),
                grid_height: view.layout.grid_height(&view.model),
                model: &view.model,
                layout: &view.layout,
                theme: &view.theme,
            };
            painter.rect_filled(response.rect, 0.0, ctx.theme.background);
            paint_rows(&ctx);
            paint_grid(&ctx);
            paint_notes(&ctx, view.selected);
            paint_intervals(&ctx);
            if view.playhead.is_playing || view.playhead.current_beat > 0.0 {
                let x = ctx.layout.beat_to_x(view.playhead.current_beat);
                ctx.vertical(x, ctx.grid_height, ctx.theme.playhead);
            }
            response
        });

        self.set_viewport(output.inner_rect.width(), output.state.offset.x);
        let response = output.inner;
        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                let local = (pos - response.rect.min).to_pos2();
                self.select_note_at(local);
            }
        }
        self.show_detail(ui.ctx());
        response
    }

    fn show_detail(&mut self, ctx: &egui::Context) {
        let Some(text) = self.detail.clone() else {
            return;
        };
        let mut open = true;
        egui::Window::new("Note")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.monospace(text);
            });
        if !open {
            self.close_detail();
        }
    }
}

fn paint_rows(ctx: &RollCtx<'_>) {
    for (row, &pitch) in ctx.model.visible_pitches.iter().enumerate() {
        let rows = ctx.layout.row_rect(row, 0.0).y_range();
        let rect = ctx.to_screen(Rect::from_x_y_ranges(ctx.span, rows));
        ctx.painter.rect_filled(rect, 0.0, row_color(ctx.theme, pitch));
        if ctx.model.is_scale_pitch(pitch) {
            ctx.painter.rect_filled(rect, 0.0, ctx.theme.scale_highlight);
        }
        ctx.painter.line_segment(
            [rect.left_bottom(), rect.right_bottom()],
            ctx.theme.row_divider,
        );
        // Band starts at the visible left edge, so names survive scrolling.
        ctx.painter.text(
            pos2(rect.left() + 4.0, rect.center().y),
            Align2::LEFT_CENTER,
            pitch_name(pitch),
            FontId::proportional(11.0),
            ctx.theme.label,
        );
    }
}

fn paint_grid(ctx: &RollCtx<'_>) {
    for beat in visible_beats(ctx.span, ctx.layout.beat_scale) {
        let x = ctx.layout.beat_to_x(beat as f64);
        let labelled = beat % BEATS_PER_LABEL == 0;
        let stroke = if labelled {
            ctx.theme.grid_bar
        } else {
            ctx.theme.grid_beat
        };
        ctx.vertical(x, ctx.grid_height, stroke);
        if labelled {
            ctx.painter.text(
                ctx.origin + vec2(x + 2.0, ctx.grid_height + 2.0),
                Align2::LEFT_TOP,
                beat.to_string(),
                FontId::proportional(11.0),
                ctx.theme.text,
            );
        }
    }
}

fn paint_notes(ctx: &RollCtx<'_>, selected: Option<usize>) {
    for (index, note) in ctx.model.notes.iter().enumerate() {
        let Some(rect) = ctx.layout.note_rect(ctx.model, note) else {
            continue;
        };
        if rect.max.x < ctx.span.min || rect.min.x > ctx.span.max {
            continue;
        }
        let rect = ctx.to_screen(rect).shrink2(vec2(0.0, 1.0));
        let is_selected = selected == Some(index);
        ctx.painter.rect_filled(
            rect,
            3.0,
            ctx.theme.note_color(ctx.model, note, is_selected),
        );
        let border = if is_selected {
            ctx.theme.selected_border
        } else {
            ctx.theme.note_border
        };
        ctx.painter.rect_stroke(rect, 3.0, border);
    }
}

fn paint_intervals(ctx: &RollCtx<'_>) {
    for connector in connector_segments(ctx.model, ctx.layout) {
        if connector.x + LABEL_SLACK < ctx.span.min || connector.x > ctx.span.max {
            continue;
        }
        let from = ctx.origin + vec2(connector.x, connector.from_y);
        let to = ctx.origin + vec2(connector.x, connector.to_y);
        ctx.painter.line_segment([from, to], ctx.theme.interval);
        ctx.painter.circle_filled(to, 2.5, ctx.theme.interval.color);
        ctx.painter.text(
            ctx.origin + vec2(connector.x + 4.0, (connector.from_y + connector.to_y) * 0.5),
            Align2::LEFT_CENTER,
            connector.label,
            FontId::proportional(11.0),
            ctx.theme.interval_text,
        );
    }
}
