use chrono::{DateTime, Local, Utc};
use eframe::egui;
use eframe::egui::scroll_area::{ScrollAreaOutput, State};

use crate::common::ChatMessage;
use crate::ui::controller::ScrollSurface;
use crate::ui::state::ScrollMetrics;

const AVATAR_COLOR: egui::Color32 = egui::Color32::from_rgb(16, 185, 129);

pub fn render<'a>(
    ui: &mut egui::Ui,
    messages: impl Iterator<Item = &'a ChatMessage>,
) -> ScrollAreaOutput<()> {
    egui::ScrollArea::vertical()
        .auto_shrink([false; 2])
        .show(ui, |ui| {
            for message in messages {
                render_message(ui, message);
                ui.add_space(8.0);
            }
        })
}

pub fn scroll_metrics(output: &ScrollAreaOutput<()>) -> ScrollMetrics {
    ScrollMetrics {
        scroll_height: output.content_size.y,
        scroll_top: output.state.offset.y,
        client_height: output.inner_rect.height(),
    }
}

fn render_message(ui: &mut egui::Ui, message: &ChatMessage) {
    // own messages on the right, everyone else on the left
    let layout = if message.is_current_user {
        egui::Layout::right_to_left(egui::Align::TOP)
    } else {
        egui::Layout::left_to_right(egui::Align::TOP)
    };

    ui.with_layout(layout, |ui| {
        ui.group(|ui| {
            ui.vertical(|ui| {
                if !message.is_current_user {
                    ui.horizontal(|ui| {
                        ui.colored_label(AVATAR_COLOR, initials(&message.sender));
                        ui.label(egui::RichText::new(&message.sender).strong());
                    });
                }
                ui.label(message.content.as_str());
                ui.label(egui::RichText::new(format_time(message.timestamp)).small().weak());
            });
        });
    });
}

/// Up to two uppercase initials, one per space-separated word.
pub fn initials(name: &str) -> String {
    name.split(' ')
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect()
}

pub fn format_time(timestamp: DateTime<Utc>) -> String {
    timestamp.with_timezone(&Local).format("%I:%M %p").to_string()
}

/// Scrolls the message area by rewriting its stored offset.
pub struct AreaScroller<'a> {
    ctx: &'a egui::Context,
    id: egui::Id,
    state: Option<State>,
    metrics: ScrollMetrics,
}

impl<'a> AreaScroller<'a> {
    pub fn new(ctx: &'a egui::Context, output: &ScrollAreaOutput<()>) -> Self {
        Self {
            ctx,
            id: output.id,
            state: Some(output.state.clone()),
            metrics: scroll_metrics(output),
        }
    }
}

impl ScrollSurface for AreaScroller<'_> {
    fn scroll_to_bottom(&mut self) {
        if let Some(mut state) = self.state.take() {
            state.offset.y = self.metrics.max_scroll_top();
            state.store(self.ctx, self.id);
            self.ctx.request_repaint();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn initials_take_first_letters_of_first_two_words() {
        assert_eq!(initials("AI"), "A");
        assert_eq!(initials("jane doe"), "JD");
        assert_eq!(initials("Mary Ann Smith"), "MA");
        assert_eq!(initials("  spaced  out "), "SO");
        assert_eq!(initials(""), "");
    }

    #[test]
    fn time_is_two_digit_twelve_hour_clock() {
        let timestamp = Utc.with_ymd_and_hms(2024, 5, 1, 10, 5, 0).unwrap();
        let formatted = format_time(timestamp);

        assert_eq!(formatted.len(), 8);
        assert!(formatted[..2].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(&formatted[2..3], ":");
        assert!(formatted.ends_with("AM") || formatted.ends_with("PM"));
    }
}
