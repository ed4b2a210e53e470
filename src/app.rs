use crate::backend::BackendClient;
use crate::controller::ChatController;
use crate::event::AppEvent;
use crate::theme::Theme;
use crate::transcript::{Bubble, Role};
use eframe::egui::{self, RichText, ScrollArea};
use std::sync::mpsc::{Receiver, TryRecvError};

const SUGGESTIONS: [&str; 3] = [
    "What can you help me with?",
    "Summarize what you just said.",
    "Tell me something interesting.",
];

const COMPOSER_HEIGHT: f32 = 110.0;

pub struct ParleyApp {
    rx: Receiver<AppEvent>,
    backend: BackendClient,
    controller: ChatController,
    theme: Theme,
    input_buffer: String,
    scroll_to_bottom: bool,
}

impl ParleyApp {
    pub fn new(rx: Receiver<AppEvent>, backend: BackendClient, controller: ChatController) -> Self {
        Self {
            rx,
            backend,
            controller,
            theme: Theme::default(),
            input_buffer: String::new(),
            scroll_to_bottom: true,
        }
    }

    fn drain_events(&mut self, ctx: &egui::Context) {
        loop {
            match self.rx.try_recv() {
                Ok(event) => {
                    self.controller.apply_event(event);
                    self.scroll_to_bottom = true;
                    ctx.request_repaint();
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    log::warn!("backend event channel disconnected");
                    break;
                }
            }
        }
    }

    fn submit(&mut self) {
        let Some(outbound) = self.controller.submit(&self.input_buffer) else {
            return;
        };

        self.input_buffer.clear();
        self.backend.send_message(outbound.message, outbound.session_id);
        self.scroll_to_bottom = true;
    }

    fn reset_conversation(&mut self) {
        if let Some(clear) = self.controller.reset_conversation() {
            self.backend.clear_session(Some(clear.session_id));
        }
        self.input_buffer.clear();
        self.scroll_to_bottom = true;
    }

    fn render_top_bar(&mut self, ctx: &egui::Context) {
        let mut reset_clicked = false;

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong("Parley");
                ui.separator();
                let (bg, fg) = self.theme.status_colors(self.controller.status().mode());
                self.theme.status_frame(bg).show(ui, |ui| {
                    ui.label(
                        RichText::new(self.controller.status().label())
                            .color(fg)
                            .size(12.0),
                    );
                });
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("New chat").clicked() {
                        reset_clicked = true;
                    }
                });
            });
        });

        if reset_clicked {
            self.reset_conversation();
        }
    }

    fn render_chat_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let transcript_height = (ui.available_height() - COMPOSER_HEIGHT).max(120.0);
            ScrollArea::vertical()
                .id_salt("chat_transcript")
                .max_height(transcript_height)
                .auto_shrink([false, false])
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    for bubble in self.controller.bubbles() {
                        render_bubble(ui, &self.theme, bubble);
                    }

                    if self.scroll_to_bottom {
                        ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
                    }
                });
            self.scroll_to_bottom = false;

            if self.controller.is_fresh() {
                ui.horizontal_wrapped(|ui| {
                    for suggestion in SUGGESTIONS {
                        if ui.small_button(suggestion).clicked() {
                            self.input_buffer = suggestion.to_string();
                        }
                    }
                });
            }

            ui.separator();
            self.render_composer(ctx, ui);
        });
    }

    fn render_composer(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        let input_enabled = !self.controller.is_sending();
        let hint = if input_enabled {
            "Type a message…"
        } else {
            "Waiting for a reply…"
        };

        // Enter submits; Shift+Enter falls through to the text edit and
        // inserts a newline. Consuming the key before the widget runs keeps
        // the submission keystroke out of the buffer.
        let composer_id = egui::Id::new("composer_input");
        let mut send_now = false;
        if input_enabled && ctx.memory(|memory| memory.has_focus(composer_id)) {
            send_now = ui.input_mut(|input| {
                input.consume_key(egui::Modifiers::NONE, egui::Key::Enter)
            });
        }

        self.theme.composer_frame().show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.add_enabled(
                    input_enabled,
                    egui::TextEdit::multiline(&mut self.input_buffer)
                        .id(composer_id)
                        .desired_rows(2)
                        .desired_width(ui.available_width() - 64.0)
                        .frame(false)
                        .hint_text(hint),
                );

                let clicked = ui
                    .add_enabled(
                        input_enabled && !self.input_buffer.trim().is_empty(),
                        egui::Button::new("Send"),
                    )
                    .clicked();
                send_now |= clicked;
            });
        });

        if send_now && input_enabled {
            self.submit();
        }
    }
}

fn render_bubble(ui: &mut egui::Ui, theme: &Theme, bubble: &Bubble) {
    let (align, fill, text) = match bubble.role {
        Role::User => (
            egui::Align::Max,
            theme.bubble_user_fill,
            RichText::new(&bubble.text).color(theme.text_on_accent),
        ),
        Role::Assistant => (
            egui::Align::Min,
            theme.bubble_assistant_fill,
            RichText::new(&bubble.text).color(theme.text_primary),
        ),
        Role::Typing => (
            egui::Align::Min,
            theme.surface_1,
            RichText::new(&bubble.text).color(theme.text_muted).italics(),
        ),
    };

    ui.with_layout(egui::Layout::top_down(align), |ui| {
        theme.bubble_frame(fill).show(ui, |ui| {
            ui.set_max_width(ui.available_width() * 0.82);
            ui.label(text);
        });
    });
}

impl eframe::App for ParleyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events(ctx);
        self.render_top_bar(ctx);
        self.render_chat_panel(ctx);
    }
}
