use eframe::egui;

/// Draw the input row. Returns the content to submit when the user
/// sends; the field itself is only cleared once the backend confirms
/// the write.
pub fn render(ui: &mut egui::Ui, input_text: &mut String) -> Option<String> {
    let mut send = false;
    ui.horizontal(|ui| {
        let response = ui.add_sized(
            [ui.available_width() - 60.0, ui.spacing().interact_size.y],
            egui::TextEdit::singleline(input_text).hint_text("Type a message..."),
        );
        if ui.button("Send").clicked() {
            send = true;
        }

        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            send = true;
        }
    });

    if send { submission(input_text) } else { None }
}

/// Whitespace-only input is not a message.
fn submission(input: &str) -> Option<String> {
    if input.trim().is_empty() {
        None
    } else {
        Some(input.to_string())
    }
}
