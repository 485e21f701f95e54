use eframe::egui;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submit {
    Button,
    EnterKey,
}

/// Edits `input_text` in place and reports how the user asked to send, if at all.
pub fn render(ui: &mut egui::Ui, input_text: &mut String, is_sending: bool) -> Option<Submit> {
    let mut submit = None;
    ui.horizontal(|ui| {
        let can_send = !is_sending && !input_text.trim().is_empty();
        let response = ui.add_enabled(
            !is_sending,
            egui::TextEdit::singleline(input_text).hint_text("Type your message..."),
        );

        if is_sending {
            ui.spinner();
        } else if ui.add_enabled(can_send, egui::Button::new("Send")).clicked() {
            submit = Some(Submit::Button);
        }

        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            submit = Some(Submit::EnterKey);
            response.request_focus();
        }
    });

    submit
}
