use eframe::egui;

use super::plot::{self, Axis};

pub fn render_waveform(ui: &mut egui::Ui, xs: &[f32], samples: &[f32], height: f32) {
    ui.group(|ui| {
        let (rect, painter) = plot::plot_frame(ui, "Real-time Waveform", height);

        // Center line
        plot::horizontal_line(&painter, rect, 0.5);

        if samples.len() > 1 {
            let x_axis = Axis::linear(0.0, (samples.len() - 1) as f32);
            plot::trace(
                &painter,
                rect,
                xs,
                samples,
                x_axis,
                Axis::linear(-1.0, 1.0),
                egui::Color32::from_rgb(0, 255, 255),
            );
        }
    });
}
