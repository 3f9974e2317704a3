use eframe::egui;

use super::plot::{self, Axis};
use crate::consts::HISTORY_SECONDS;

/// Scrolling history over the full window; the part that is not filled yet
/// stays empty on the right.
pub fn render_history(ui: &mut egui::Ui, xs: &[f32], samples: &[f32], height: f32) {
    ui.group(|ui| {
        let (rect, painter) = plot::plot_frame(ui, "Scrolling Waveform History", height);
        plot::horizontal_line(&painter, rect, 0.5);

        let Some(&last_x) = xs.last() else {
            return;
        };

        // One min/max bar per pixel column instead of every sample.
        let filled = (last_x / HISTORY_SECONDS as f32).clamp(0.0, 1.0);
        let columns = plot::min_max_columns(samples, (rect.width() * filled).max(1.0) as usize);
        let y_axis = Axis::linear(-1.0, 1.0);
        let stroke = egui::Stroke::new(1.0, egui::Color32::WHITE);

        for (i, &(lo, hi)) in columns.iter().enumerate() {
            let (Some(f_lo), Some(f_hi)) = (y_axis.fraction(lo), y_axis.fraction(hi)) else {
                continue;
            };
            let x = rect.left() + i as f32 + 0.5;
            painter.line_segment(
                [
                    egui::pos2(x, rect.bottom() - f_lo * rect.height()),
                    egui::pos2(x, rect.bottom() - f_hi * rect.height()),
                ],
                stroke,
            );
        }
    });
}
