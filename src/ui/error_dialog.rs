//! Copyable error dialog
//!
//! Presents a failure summary plus an optional technical-detail block, with
//! a copy action that places the full report on the system clipboard and
//! confirms transiently before reverting.

use eframe::egui;
use egui::{Align2, Color32, RichText, Vec2};
use std::time::Instant;

use crate::report::{compose_report, copy_to_clipboard, ErrorRecord, COPY_CONFIRM_INTERVAL};

pub struct ErrorDialog {
    title: String,
    message: String,
    record: Option<ErrorRecord>,
    copied_at: Option<Instant>,
}

impl ErrorDialog {
    pub fn new(
        title: impl Into<String>,
        message: impl Into<String>,
        record: Option<ErrorRecord>,
    ) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            record,
            copied_at: None,
        }
    }

    /// Render the dialog. Returns false once the user dismissed it.
    pub fn render(&mut self, ctx: &egui::Context) -> bool {
        let mut open = true;
        let title = self.title.clone();

        egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
            .min_width(420.0)
            .show(ctx, |ui| {
                ui.label(&self.message);

                if let Some(detail) = self
                    .record
                    .as_ref()
                    .and_then(|r| r.technical_detail.as_deref())
                    .filter(|d| !d.trim().is_empty())
                {
                    ui.add_space(8.0);
                    ui.label(RichText::new("Technical Details:").strong());
                    ui.label(
                        RichText::new(detail)
                            .monospace()
                            .size(11.0)
                            .color(Color32::LIGHT_GRAY),
                    );
                }

                ui.add_space(12.0);
                ui.horizontal(|ui| {
                    let copied_recently = self
                        .copied_at
                        .map(|t| t.elapsed() < COPY_CONFIRM_INTERVAL)
                        .unwrap_or(false);

                    let copy_label = if copied_recently {
                        "Copied!"
                    } else {
                        "Copy Error Details"
                    };

                    if ui.button(copy_label).clicked() {
                        let payload =
                            compose_report(&self.title, &self.message, self.record.as_ref());
                        if copy_to_clipboard(&payload) {
                            self.copied_at = Some(Instant::now());
                        }
                    }

                    if copied_recently {
                        // Wake up again to revert the label.
                        ctx.request_repaint_after(COPY_CONFIRM_INTERVAL / 4);
                    }

                    if ui.button("OK").clicked() {
                        open = false;
                    }
                });
            });

        open
    }
}
