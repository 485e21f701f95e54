use eframe::egui;

pub fn render(ui: &mut egui::Ui, title: &str, peer_name: &str) {
    ui.horizontal(|ui| {
        ui.colored_label(egui::Color32::from_rgb(16, 185, 129), "●");
        ui.heading(title);

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(egui::RichText::new(peer_name).weak());
        });
    });
}
