use eframe::egui;

use crate::ui::state::Toast;

/// Draw transient error notifications in the bottom-right corner.
pub fn render(ctx: &egui::Context, toasts: &[Toast]) {
    if toasts.is_empty() {
        return;
    }

    egui::Area::new(egui::Id::new("error_toasts"))
        .anchor(egui::Align2::RIGHT_BOTTOM, [-16.0, -16.0])
        .show(ctx, |ui| {
            for toast in toasts {
                egui::Frame::popup(ui.style())
                    .fill(egui::Color32::from_rgb(127, 29, 29))
                    .show(ui, |ui| {
                        ui.colored_label(egui::Color32::WHITE, &toast.text);
                    });
                ui.add_space(4.0);
            }
        });
}
