use eframe::egui;

/// Two vertical L/R level bars filling the available space.
pub fn render_meter(ui: &mut egui::Ui, levels: [f32; 2]) {
    let margin = 3.0;
    let label_height = 15.0;

    let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::hover());
    let rect = response.rect;
    let bar_area_height = rect.height() - label_height;
    let bar_width = (rect.width() - 3.0 * margin) / 2.0;

    for (i, (level, label)) in levels.iter().zip(["L", "R"]).enumerate() {
        let left = rect.left() + margin + i as f32 * (bar_width + margin);
        let top = rect.top() + margin;
        let bottom = rect.top() + bar_area_height - margin;

        let slot = egui::Rect::from_min_max(
            egui::pos2(left, top),
            egui::pos2(left + bar_width, bottom),
        );
        painter.rect_filled(slot, 0.0, egui::Color32::BLACK);

        let bar_height = level.clamp(0.0, 1.0) * slot.height();
        let bar = egui::Rect::from_min_max(
            egui::pos2(left, bottom - bar_height),
            egui::pos2(left + bar_width, bottom),
        );
        painter.rect_filled(bar, 0.0, egui::Color32::from_rgb(0, 255, 255));

        painter.text(
            egui::pos2(left + bar_width / 2.0, rect.top() + bar_area_height),
            egui::Align2::CENTER_TOP,
            label,
            egui::FontId::proportional(13.0),
            ui.visuals().strong_text_color(),
        );
    }
}
