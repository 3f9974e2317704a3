use eframe::egui;

use crate::audio::{StreamState, StreamStats};
use crate::config::StreamConfig;

pub fn render_live_monitoring(
    ui: &mut egui::Ui,
    state: &StreamState,
    config: Option<&StreamConfig>,
    stats: &StreamStats,
) {
    ui.horizontal(|ui| {
        match state {
            StreamState::Running => {
                ui.colored_label(egui::Color32::GREEN, "Listening");
            }
            StreamState::Starting => {
                ui.colored_label(egui::Color32::YELLOW, "Starting");
            }
            StreamState::Idle => {
                ui.colored_label(egui::Color32::GRAY, "No Audio Stream");
            }
            StreamState::Error(reason) => {
                ui.colored_label(egui::Color32::RED, format!("Audio Stream Error: {reason}"));
            }
        }

        if let Some(config) = config {
            ui.separator();
            ui.label(format!(
                "{}ch @ {} Hz, {} frames",
                config.channels(),
                config.sample_rate(),
                config.frames()
            ));
        }

        ui.separator();
        ui.label(format!("Blocks: {}", stats.blocks()));

        let short_blocks = stats.short_blocks();
        if short_blocks > 0 {
            ui.separator();
            ui.label(format!("Short deliveries: {short_blocks}"));
        }

        let warnings = stats.status_warnings();
        if warnings > 0 {
            ui.separator();
            ui.colored_label(egui::Color32::ORANGE, format!("Driver warnings: {warnings}"));
        }
    });
}
