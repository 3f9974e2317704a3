use eframe::egui;

use super::plot::{self, Axis};
use crate::consts::SPECTRUM_DB_RANGE;

/// Current and averaged spectrum on a logarithmic frequency axis.
pub fn render_spectrum(
    ui: &mut egui::Ui,
    freqs_khz: &[f32],
    current_db: &[f32],
    average_db: &[f32],
    height: f32,
) {
    ui.group(|ui| {
        let (rect, painter) =
            plot::plot_frame(ui, "Real-time FFT (Logarithmic Frequency)", height);

        let (min_db, max_db) = SPECTRUM_DB_RANGE;
        let y_axis = Axis::linear(min_db, max_db);
        for db in [-100.0, -80.0, -60.0, -40.0, -20.0] {
            if let Some(fraction) = y_axis.fraction(db) {
                plot::horizontal_line(&painter, rect, fraction);
            }
        }

        // Bin 0 is DC and has no place on a log axis.
        let (Some(&lowest), Some(&highest)) = (freqs_khz.get(1), freqs_khz.last()) else {
            return;
        };
        let x_axis = Axis::log(lowest, highest);

        plot::trace(
            &painter,
            rect,
            freqs_khz,
            current_db,
            x_axis,
            y_axis,
            egui::Color32::YELLOW,
        );
        plot::trace(
            &painter,
            rect,
            freqs_khz,
            average_db,
            x_axis,
            y_axis,
            egui::Color32::RED,
        );

        painter.text(
            rect.right_top() + egui::vec2(-8.0, 6.0),
            egui::Align2::RIGHT_TOP,
            "Current FFT",
            egui::FontId::proportional(12.0),
            egui::Color32::YELLOW,
        );
        painter.text(
            rect.right_top() + egui::vec2(-8.0, 22.0),
            egui::Align2::RIGHT_TOP,
            "Average FFT",
            egui::FontId::proportional(12.0),
            egui::Color32::RED,
        );
        painter.text(
            rect.left_bottom() + egui::vec2(6.0, -4.0),
            egui::Align2::LEFT_BOTTOM,
            format!("{lowest:.2} to {highest:.1} kHz"),
            egui::FontId::proportional(11.0),
            egui::Color32::GRAY,
        );
    });
}
