use std::sync::Arc;
use std::time::Duration;

use eframe::egui;

use crate::common::types::PLACEHOLDER_SENDER;
use crate::network::SyncEngine;

use super::components::input_bar::{self, Submit};
use super::components::{chat_area, header};
use super::controller::ChatController;

pub const WINDOW_TITLE: &str = "Shield 2.O";
const REPAINT_INTERVAL: Duration = Duration::from_millis(250);

pub struct ChatApp {
    engine: Arc<SyncEngine>,
    controller: ChatController,
}

impl ChatApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        engine: Arc<SyncEngine>,
        controller: ChatController,
    ) -> Self {
        Self { engine, controller }
    }

    fn render_input(&mut self, ui: &mut egui::Ui) {
        if let Some(error) = self.controller.send_error() {
            ui.colored_label(egui::Color32::RED, error);
        }

        let mut draft = self.controller.draft_text().to_owned();
        let submit = input_bar::render(ui, &mut draft, self.controller.is_sending());
        self.controller.on_input_change(draft);

        match submit {
            Some(Submit::Button) => {
                self.controller.on_submit();
            }
            Some(Submit::EnterKey) => {
                self.controller.on_enter_key();
            }
            None => {}
        }
    }
}

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.controller.poll_events();
        if self.controller.is_disposed() {
            return;
        }

        egui::TopBottomPanel::top("chat_header").show(ctx, |ui| {
            header::render(ui, WINDOW_TITLE, PLACEHOLDER_SENDER);
        });

        egui::TopBottomPanel::bottom("chat_input").show(ctx, |ui| {
            self.render_input(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let output = chat_area::render(ui, self.controller.visible_messages());
            self.controller
                .record_scroll_metrics(chat_area::scroll_metrics(&output));

            let mut scroller = chat_area::AreaScroller::new(ctx, &output);
            self.controller.after_render(&mut scroller);
        });

        // snapshots arrive from the network task without waking egui
        ctx.request_repaint_after(REPAINT_INTERVAL);
    }
}

impl Drop for ChatApp {
    fn drop(&mut self) {
        self.controller.dispose();
        self.engine.stop();
    }
}
