//! Extraction surface: drop zone, controls, extracted text, status line.
//!
//! One surface owns one orchestrator; the upload trigger is disabled while a
//! task is in flight and re-enabled on completion. Drop-gesture affordance
//! (recoloring the target region) lives here, decoupled from validation.

use eframe::egui;
use egui::{Color32, RichText, Rounding, Stroke};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

use crate::engine::{Engine, EngineState};
use crate::extract::ExtractError;
use crate::ingest::{self, IngestCandidate, IMAGE_EXTENSIONS};
use crate::report::{copy_to_clipboard, ErrorRecord, COPY_CONFIRM_INTERVAL};
use crate::task::{SubmitError, TaskOrchestrator};

use super::ErrorDialog;

const DROP_HINT: &str = "Drag & Drop Image Here\nor click Upload to select a file";
const DROP_ACTIVE_HINT: &str = "Drop Image Here\nRelease to process";
const SUPPORTED_HINT: &str = "Supported: PNG, JPG, JPEG, GIF, BMP, TIFF";

pub struct ExtractSurface {
    engine: Arc<Engine>,
    orchestrator: TaskOrchestrator,
    extracted_text: String,
    has_text: bool,
    status_text: String,
    drop_hover: bool,
    dialog: Option<ErrorDialog>,
    copied_text_at: Option<Instant>,
}

impl ExtractSurface {
    pub fn new(engine: Arc<Engine>) -> Self {
        let status_text = match engine.state() {
            EngineState::Ready => "Ready".to_string(),
            EngineState::Unavailable { reason, .. } => format!("Unavailable: {reason}"),
            EngineState::Uninitialized => "Unavailable: engine not initialized".to_string(),
        };

        Self {
            orchestrator: TaskOrchestrator::new(engine.clone()),
            engine,
            extracted_text: String::new(),
            has_text: false,
            status_text,
            drop_hover: false,
            dialog: None,
            copied_text_at: None,
        }
    }

    /// Marshal any finished task back into display state. Interactive
    /// thread only; the outcome of a task is applied exactly once.
    pub fn process_completions(&mut self, ctx: &egui::Context) {
        if let Some(outcome) = self.orchestrator.poll() {
            match outcome.result {
                Ok(text) => {
                    info!("extraction succeeded for {}", outcome.source_label);
                    self.extracted_text = text;
                    self.has_text = true;
                    self.status_text =
                        format!("Text extracted successfully from: {}", outcome.source_label);
                }
                Err(err) => {
                    self.status_text = "Error extracting text".to_string();
                    let record = ErrorRecord::from_extract_error(&err);
                    self.dialog = Some(ErrorDialog::new(
                        "Error",
                        format!(
                            "Failed to extract text from image: {}",
                            outcome.source_label
                        ),
                        Some(record),
                    ));
                }
            }
        }

        if self.orchestrator.is_busy() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }

    /// Accept or reject files offered through the drop gesture.
    pub fn handle_drops(&mut self, ctx: &egui::Context) {
        self.drop_hover = ctx.input(|i| !i.raw.hovered_files.is_empty());

        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .collect()
        });
        if dropped.is_empty() {
            return;
        }

        match ingest::candidate_from_drop(&dropped) {
            Ok(candidate) => self.process_candidate(candidate),
            Err(err) => self.show_validation_error(err),
        }
    }

    pub fn render(&mut self, ui: &mut egui::Ui) {
        self.render_drop_zone(ui);
        ui.add_space(12.0);
        self.render_controls(ui);
        ui.add_space(8.0);
        ui.label(&self.status_text);
        ui.add_space(8.0);
        self.render_text_area(ui);

        if let Some(mut dialog) = self.dialog.take() {
            if dialog.render(ui.ctx()) {
                self.dialog = Some(dialog);
            }
        }
    }

    fn render_drop_zone(&mut self, ui: &mut egui::Ui) {
        let (fill, stroke, text_color) = if self.drop_hover {
            (
                Color32::from_rgb(24, 44, 24),
                Color32::from_rgb(0, 160, 0),
                Color32::from_rgb(120, 220, 120),
            )
        } else {
            (
                Color32::from_rgb(28, 32, 40),
                Color32::from_gray(90),
                Color32::from_rgb(110, 150, 200),
            )
        };

        egui::Frame::none()
            .fill(fill)
            .stroke(Stroke::new(1.5, stroke))
            .rounding(Rounding::same(6.0))
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.set_min_height(110.0);
                ui.centered_and_justified(|ui| {
                    let hint = if self.drop_hover {
                        DROP_ACTIVE_HINT
                    } else {
                        DROP_HINT
                    };
                    ui.label(RichText::new(format!("{hint}\n{SUPPORTED_HINT}")).color(text_color));
                });
            });
    }

    fn render_controls(&mut self, ui: &mut egui::Ui) {
        let busy = self.orchestrator.is_busy();

        ui.horizontal(|ui| {
            if ui
                .add_enabled(!busy, egui::Button::new("Upload Image"))
                .clicked()
            {
                self.open_file_dialog();
            }

            let copied_recently = self
                .copied_text_at
                .map(|t| t.elapsed() < COPY_CONFIRM_INTERVAL)
                .unwrap_or(false);
            let copy_label = if copied_recently { "Copied!" } else { "Copy Text" };

            if ui
                .add_enabled(self.has_text, egui::Button::new(copy_label))
                .clicked()
                && copy_to_clipboard(&self.extracted_text)
            {
                self.copied_text_at = Some(Instant::now());
                self.status_text = "Text copied to clipboard".to_string();
            }
            if copied_recently {
                ui.ctx().request_repaint_after(COPY_CONFIRM_INTERVAL / 4);
            }

            if ui
                .add_enabled(self.has_text, egui::Button::new("Clear"))
                .clicked()
            {
                self.extracted_text.clear();
                self.has_text = false;
                self.status_text = "Text cleared".to_string();
            }

            if busy {
                let spinner = ui.spinner();
                if let Some(task) = self.orchestrator.current() {
                    spinner.on_hover_text(format!("Extracting: {}", task.source_label()));
                }
            }
        });
    }

    fn render_text_area(&mut self, ui: &mut egui::Ui) {
        ui.label(RichText::new("Extracted Text").strong());
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.add_sized(
                    ui.available_size(),
                    egui::TextEdit::multiline(&mut self.extracted_text.as_str())
                        .font(egui::TextStyle::Monospace),
                );
            });
    }

    fn open_file_dialog(&mut self) {
        let picked = rfd::FileDialog::new()
            .add_filter("Image Files", &IMAGE_EXTENSIONS)
            .pick_file();
        let Some(path) = picked else { return };

        match ingest::candidate_from_path(&path) {
            Ok(candidate) => self.process_candidate(candidate),
            Err(err) => self.show_validation_error(err),
        }
    }

    /// Route a validated candidate into the pipeline.
    fn process_candidate(&mut self, candidate: IngestCandidate) {
        if !self.engine.state().is_ready() {
            self.show_engine_unavailable();
            return;
        }

        let bytes = match std::fs::read(&candidate.path) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.dialog = Some(ErrorDialog::new(
                    "Error",
                    format!("Failed to read file: {}", candidate.label),
                    Some(ErrorRecord::from_error("IoError", &e)),
                ));
                return;
            }
        };

        match self.orchestrator.submit(candidate.label.clone(), bytes) {
            Ok(()) => {
                self.status_text = format!("Extracting text from: {}", candidate.label);
            }
            Err(SubmitError::Busy) => {
                info!("submission rejected, extraction already in progress");
            }
        }
    }

    fn show_validation_error(&mut self, err: ingest::ValidationError) {
        self.dialog = Some(ErrorDialog::new(
            "Error",
            "Please choose an image file (PNG, JPG, JPEG, GIF, BMP, TIFF)",
            Some(ErrorRecord::from_error("ValidationError", &err)),
        ));
    }

    fn show_engine_unavailable(&mut self) {
        let record = match self.engine.state() {
            EngineState::Unavailable { reason, .. } => {
                Some(ErrorRecord::from_extract_error(&ExtractError::EngineUnavailable {
                    reason: reason.clone(),
                }))
            }
            _ => None,
        };

        self.dialog = Some(ErrorDialog::new(
            "OCR Not Available",
            "OCR is not available.\n\n\
             This could be due to:\n\
             1. Tesseract not being installed on this system\n\
             2. Missing tessdata language files\n\
             3. This build lacking the `tesseract` feature\n\n\
             Other features keep working. Copy the technical details below \
             when reporting the problem.",
            record,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::MockBackend;
    use std::io::Write;
    use std::time::Instant;

    fn surface_with(text: &str) -> ExtractSurface {
        let engine = Arc::new(Engine::with_backend(Box::new(MockBackend::new(text))));
        ExtractSurface::new(engine)
    }

    fn temp_png() -> tempfile::NamedTempFile {
        let img = image::RgbImage::from_pixel(4, 4, image::Rgb([255, 255, 255]));
        let mut bytes = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .unwrap();

        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(&bytes).unwrap();
        file
    }

    fn drain_until_idle(surface: &mut ExtractSurface, ctx: &egui::Context) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while surface.orchestrator.is_busy() {
            surface.process_completions(ctx);
            assert!(Instant::now() < deadline, "task never completed");
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn valid_submission_runs_idle_busy_idle() {
        let ctx = egui::Context::default();
        let mut surface = surface_with("recognized text");
        assert_eq!(surface.status_text, "Ready");

        let file = temp_png();
        let candidate = ingest::candidate_from_path(file.path()).unwrap();
        let label = candidate.label.clone();

        surface.process_candidate(candidate);
        assert!(surface.orchestrator.is_busy(), "trigger should be disabled");
        assert_eq!(surface.status_text, format!("Extracting text from: {label}"));

        drain_until_idle(&mut surface, &ctx);
        assert!(!surface.orchestrator.is_busy(), "trigger should be re-enabled");
        assert_eq!(surface.extracted_text, "recognized text");
        assert!(surface.has_text);
        assert_eq!(
            surface.status_text,
            format!("Text extracted successfully from: {label}")
        );
        assert!(surface.dialog.is_none());
    }

    #[test]
    fn concurrent_submission_does_not_disturb_the_running_task() {
        let ctx = egui::Context::default();
        let mut surface = surface_with("first");

        let file = temp_png();
        let first = ingest::candidate_from_path(file.path()).unwrap();
        let second = first.clone();
        let label = first.label.clone();

        surface.process_candidate(first);
        surface.process_candidate(second);
        assert_eq!(surface.status_text, format!("Extracting text from: {label}"));

        drain_until_idle(&mut surface, &ctx);
        assert_eq!(surface.extracted_text, "first");
    }

    #[test]
    fn unavailable_engine_surfaces_a_dialog_without_submitting() {
        let engine = Arc::new(Engine::initialize_with(
            &[PathBuf::from("/missing/tessdata")],
            |_| unreachable!(),
        ));
        let mut surface = ExtractSurface::new(engine);
        assert!(surface.status_text.starts_with("Unavailable: "));

        let file = temp_png();
        let candidate = ingest::candidate_from_path(file.path()).unwrap();
        surface.process_candidate(candidate);

        assert!(!surface.orchestrator.is_busy());
        assert!(surface.dialog.is_some());
    }

    #[test]
    fn extraction_failure_reports_and_returns_to_idle() {
        let ctx = egui::Context::default();
        let engine = Arc::new(Engine::with_backend(Box::new(
            crate::engine::testing::FailingBackend {
                message: "engine timeout".to_string(),
            },
        )));
        let mut surface = ExtractSurface::new(engine);

        let file = temp_png();
        let candidate = ingest::candidate_from_path(file.path()).unwrap();
        surface.process_candidate(candidate);

        drain_until_idle(&mut surface, &ctx);
        assert_eq!(surface.status_text, "Error extracting text");
        assert!(surface.dialog.is_some());
        assert!(!surface.has_text);
    }
}
