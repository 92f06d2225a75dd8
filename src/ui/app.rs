use std::time::Instant;

use eframe::egui;
use tokio::sync::mpsc;

use crate::common::{BackendCommand, BackendEvent};

use super::components::{chat_area, input_bar, login_panel, toasts};
use super::state::{AppState, View};

pub struct ChatApp {
    state: AppState,
    command_sender: mpsc::Sender<BackendCommand>,
    event_receiver: mpsc::Receiver<BackendEvent>,
}

impl ChatApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        command_sender: mpsc::Sender<BackendCommand>,
        event_receiver: mpsc::Receiver<BackendEvent>,
    ) -> Self {
        Self {
            state: AppState::new(),
            command_sender,
            event_receiver,
        }
    }

    fn handle_backend_events(&mut self) {
        while let Ok(event) = self.event_receiver.try_recv() {
            match event {
                BackendEvent::SignedIn(user) => self.state.signed_in(user),
                BackendEvent::SignInFailed(reason) => self.state.sign_in_failed(reason),
                BackendEvent::HistoryLoaded(history) => self.state.history_loaded(history),
                BackendEvent::HistoryFetchFailed(reason) => {
                    log::debug!("History fetch failed: {reason}");
                    self.state.history_fetch_failed();
                }
                BackendEvent::MessageInserted(message) => self.state.push_message(message),
                BackendEvent::MessageSent => self.state.message_sent(),
                BackendEvent::MessageSendFailed(reason) => {
                    log::debug!("Message send failed: {reason}");
                    self.state.message_send_failed();
                }
                BackendEvent::SignedOut => self.state.signed_out(),
            }
        }
    }

    fn send_command(&mut self, command: BackendCommand) {
        if let Err(err) = self.command_sender.try_send(command) {
            log::warn!("Failed to send command to backend: {err}");
        }
    }

    fn show_login(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(command) = login_panel::render(ui, &mut self.state.login) {
                self.state.login.pending = true;
                self.state.login.error = None;
                self.send_command(command);
            }
        });
    }

    fn show_chat(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Chat Room");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Sign Out").clicked() {
                        self.send_command(BackendCommand::SignOut);
                    }
                    if let Some(user) = &self.state.user {
                        ui.label(egui::RichText::new(&user.username).weak());
                    }
                });
            });
        });

        egui::TopBottomPanel::bottom("input_bar").show(ctx, |ui| {
            ui.add_space(4.0);
            if let Some(content) = input_bar::render(ui, &mut self.state.input_text) {
                self.send_command(BackendCommand::SendMessage { content });
            }
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            chat_area::render(ui, &self.state);
        });
    }
}

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_backend_events();
        self.state.prune_toasts(Instant::now());

        match self.state.view {
            View::Login => self.show_login(ctx),
            View::Chat => self.show_chat(ctx),
        }

        toasts::render(ctx, &self.state.toasts);

        ctx.request_repaint();
    }
}
