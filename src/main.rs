//! TextLift - pull text out of images
//!
//! A small desktop utility around a Tesseract-backed extraction pipeline:
//! drop or pick an image, get its text, copy it to the clipboard.

mod config;
mod engine;
mod extract;
mod ingest;
mod report;
mod task;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::config::AppConfig;
use crate::engine::{Engine, DATA_DIR_CANDIDATES};

/// TextLift - image to text extraction
#[derive(Parser, Debug)]
#[command(name = "textlift")]
#[command(about = "Extract text from images with Tesseract OCR")]
struct Args {
    /// Extract text from an image and print it to stdout (no window)
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// List the tessdata directories that will be searched and exit
    #[arg(long)]
    list_data_dirs: bool,
}

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    let config = load_or_create_config();

    if args.list_data_dirs {
        println!("Tessdata directories searched, in order:");
        if let Some(dir) = &config.engine.data_dir {
            println!("  {} (from config)", dir.display());
        }
        for dir in DATA_DIR_CANDIDATES {
            println!("  {dir}");
        }
        return Ok(());
    }

    info!("TextLift starting...");
    let engine = Arc::new(Engine::initialize(config.engine.data_dir.as_deref()));
    match engine.state() {
        engine::EngineState::Ready => info!("Recognition engine ready"),
        engine::EngineState::Unavailable { reason, .. } => {
            info!("Recognition engine unavailable: {reason}")
        }
        engine::EngineState::Uninitialized => {}
    }

    if let Some(path) = args.image {
        return extract_to_stdout(&engine, &path);
    }

    ui::run_app(&config, engine).map_err(|e| anyhow::anyhow!("window error: {e}"))?;

    info!("TextLift shutdown complete");

    Ok(())
}

/// One-shot mode: validate, read, extract, print.
fn extract_to_stdout(engine: &Engine, path: &std::path::Path) -> Result<()> {
    let candidate = ingest::candidate_from_path(path)?;
    let bytes = std::fs::read(&candidate.path)
        .with_context(|| format!("failed to read {}", candidate.path.display()))?;
    let text = extract::extract(engine, &candidate.label, &bytes)?;
    println!("{text}");
    Ok(())
}

/// Load configuration from file or fall back to defaults.
fn load_or_create_config() -> AppConfig {
    if let Ok(config_dir) = config::get_config_dir() {
        let config_path = config_dir.join("config.toml");
        if config_path.exists() {
            if let Ok(config) = config::load_config(&config_path) {
                info!("Loaded configuration from {:?}", config_path);
                return config;
            }
        }
    }
    info!("Using default configuration");
    AppConfig::default()
}
