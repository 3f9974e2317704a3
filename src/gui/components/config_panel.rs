use eframe::egui;

use crate::audio::DeviceInfo;
use crate::config::BlockSize;

/// Device and block size selectors. Only edits the pending selection; the
/// app state applies it.
pub fn render_config_panel(
    ui: &mut egui::Ui,
    devices: &[DeviceInfo],
    device_idx: &mut usize,
    block_size: &mut BlockSize,
) {
    ui.horizontal(|ui| {
        ui.label("Audio Device:");
        egui::ComboBox::from_id_salt("device_selector")
            .selected_text(
                devices
                    .get(*device_idx)
                    .map(|d| d.name.as_str())
                    .unwrap_or("No devices"),
            )
            .show_ui(ui, |ui| {
                for (idx, device) in devices.iter().enumerate() {
                    ui.selectable_value(device_idx, idx, &device.name)
                        .on_hover_text(format!(
                            "{} input channel(s) via {}",
                            device.max_input_channels, device.host_api
                        ));
                }
            });

        ui.add_space(12.0);

        ui.label("Buffer Size:");
        egui::ComboBox::from_id_salt("block_size_selector")
            .selected_text(block_size.to_string())
            .show_ui(ui, |ui| {
                for size in BlockSize::ALL {
                    ui.selectable_value(block_size, size, size.to_string())
                        .on_hover_text(format!("{} Hz", size.sample_rate()));
                }
            });
    });
}
