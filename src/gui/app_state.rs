use crate::audio::{CpalBackend, DeviceInfo, StreamController};
use crate::config::{APP_VERSION, BlockSize, StreamConfig};
use crate::consts::DEFAULT_BLOCK_SIZE;
use eframe::egui;
use log::{debug, info, warn};

use super::SharedFrame;
use super::components::{
    render_config_panel, render_history, render_live_monitoring, render_meter, render_spectrum,
    render_waveform,
};

pub struct AppState {
    controller: StreamController<CpalBackend>,
    devices: Vec<DeviceInfo>,
    active_device_idx: usize,
    pending_device_idx: usize, // Local selection for device selector
    active_block_size: BlockSize,
    pending_block_size: BlockSize,
    frame: SharedFrame,
}

impl eframe::App for AppState {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.controller.poll();
        if self.selection_changed() {
            self.apply_settings();
        }

        self.render_top_panel(ctx);
        self.render_meter_panel(ctx);
        self.render_central_panel(ctx);

        ctx.request_repaint();
    }
}

impl AppState {
    pub fn new(
        controller: StreamController<CpalBackend>,
        devices: Vec<DeviceInfo>,
        selected_device_idx: usize,
        frame: SharedFrame,
    ) -> Self {
        debug!("Initializing GUI state...");

        let mut state = Self {
            controller,
            devices,
            active_device_idx: selected_device_idx,
            pending_device_idx: selected_device_idx,
            active_block_size: DEFAULT_BLOCK_SIZE,
            pending_block_size: DEFAULT_BLOCK_SIZE,
            frame,
        };
        state.apply_settings();
        state
    }

    fn apply_settings(&mut self) {
        let Some(device) = self.devices.get(self.pending_device_idx) else {
            warn!("No device at index {}", self.pending_device_idx);
            return;
        };

        let config = StreamConfig::new(device, self.pending_block_size);
        debug!("Applying settings - {config:?}");

        // A failure is kept in the controller state and shown in the top panel.
        if self.controller.reconfigure(config).is_ok() {
            info!("Settings applied successfully");
        }

        self.active_device_idx = self.pending_device_idx;
        self.active_block_size = self.pending_block_size;
    }

    fn selection_changed(&self) -> bool {
        self.pending_device_idx != self.active_device_idx
            || self.pending_block_size != self.active_block_size
    }

    fn render_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.heading(format!("Audio Scope {APP_VERSION}"));
            });
            ui.add_space(4.0);
            ui.separator();
            ui.add_space(4.0);

            render_config_panel(
                ui,
                &self.devices,
                &mut self.pending_device_idx,
                &mut self.pending_block_size,
            );
            ui.add_space(4.0);

            render_live_monitoring(
                ui,
                self.controller.state(),
                self.controller.config(),
                self.controller.stats(),
            );
            ui.add_space(4.0);
        });
    }

    fn render_meter_panel(&mut self, ctx: &egui::Context) {
        let levels = self.frame.lock().levels;
        egui::SidePanel::left("meter_panel")
            .resizable(false)
            .exact_width(100.0)
            .show(ctx, |ui| {
                render_meter(ui, levels);
            });
    }

    fn render_central_panel(&mut self, ctx: &egui::Context) {
        let frame = self.frame.lock().clone();

        egui::CentralPanel::default().show(ctx, |ui| {
            // Three plots share the height, leaving room for their titles.
            let plot_height = (ui.available_height() / 3.0 - 40.0).max(60.0);

            render_waveform(ui, &frame.waveform_x, &frame.waveform, plot_height);
            render_spectrum(
                ui,
                &frame.freqs_khz,
                &frame.current_db,
                &frame.average_db,
                plot_height,
            );
            render_history(ui, &frame.history_x, &frame.history, plot_height);
        });
    }
}

impl Drop for AppState {
    fn drop(&mut self) {
        debug!("Closing audio stream...");
        self.controller.stop();
    }
}
