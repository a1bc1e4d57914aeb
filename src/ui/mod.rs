//! Interactive surface
//!
//! Single-window egui application. All UI-visible state lives on the
//! interactive thread; extraction outcomes arrive via
//! `TaskOrchestrator::poll` during the frame update.

mod error_dialog;
mod extract_view;

pub use error_dialog::ErrorDialog;

use eframe::egui;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::engine::Engine;
use extract_view::ExtractSurface;

/// The main application window, hosting one extraction surface.
pub struct TextLiftApp {
    surface: ExtractSurface,
}

impl TextLiftApp {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self {
            surface: ExtractSurface::new(engine),
        }
    }

    fn options(config: &AppConfig) -> eframe::NativeOptions {
        eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([config.window.width, config.window.height])
                .with_min_inner_size([480.0, 400.0])
                .with_title("TextLift"),
            ..Default::default()
        }
    }
}

impl eframe::App for TextLiftApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.surface.process_completions(ctx);
        self.surface.handle_drops(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::Frame::none().inner_margin(16.0).show(ui, |ui| {
                self.surface.render(ui);
            });
        });
    }
}

/// Run the application window (blocking).
pub fn run_app(config: &AppConfig, engine: Arc<Engine>) -> Result<(), eframe::Error> {
    let app = TextLiftApp::new(engine);
    eframe::run_native(
        "TextLift",
        TextLiftApp::options(config),
        Box::new(|_cc| Ok(Box::new(app))),
    )
}
