use eframe::egui;

use crate::common::ChatMessage;
use crate::ui::state::AppState;

const OWN_BUBBLE_FILL: egui::Color32 = egui::Color32::from_rgb(79, 70, 229);

pub fn render(ui: &mut egui::Ui, state: &AppState) {
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        // Every list change lands on the newest entry.
        .stick_to_bottom(true)
        .show(ui, |ui| {
            for message in &state.messages {
                message_bubble(ui, message, state.is_own_message(message));
                ui.add_space(4.0);
            }
        });
}

fn message_bubble(ui: &mut egui::Ui, message: &ChatMessage, own: bool) {
    let layout = if own {
        egui::Layout::right_to_left(egui::Align::Min)
    } else {
        egui::Layout::left_to_right(egui::Align::Min)
    };

    ui.with_layout(layout, |ui| {
        ui.set_max_width(ui.available_width() * 0.75);

        let fill = if own {
            OWN_BUBBLE_FILL
        } else {
            ui.visuals().extreme_bg_color
        };

        egui::Frame::group(ui.style())
            .fill(fill)
            .corner_radius(egui::CornerRadius::same(6))
            .inner_margin(egui::Margin::same(8))
            .show(ui, |ui| {
                if own {
                    ui.visuals_mut().override_text_color = Some(egui::Color32::WHITE);
                }
                ui.vertical(|ui| {
                    ui.horizontal(|ui| {
                        ui.label(egui::RichText::new(&message.username).small().strong());
                        ui.label(
                            egui::RichText::new(message.created_at.format("%H:%M").to_string())
                                .small()
                                .weak(),
                        );
                    });
                    ui.label(&message.content);
                });
            });
    });
}
