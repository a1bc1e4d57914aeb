//! Input ingestion and validation
//!
//! Gatekeeps what reaches extraction: the file picker and drag-and-drop
//! payloads both feed through the same extension allow-list. Drop-gesture
//! visuals are a presentation concern and live in the UI layer.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Accepted raster image suffixes, matched case-insensitively.
pub const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "gif", "bmp", "tiff", "tif"];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{name} is not a supported image file (expected: PNG, JPG, JPEG, GIF, BMP, TIFF)")]
    UnsupportedType { name: String },
    #[error("the dropped payload contained no files")]
    EmptyDrop,
}

/// A validated input, ready for admission to the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestCandidate {
    pub path: PathBuf,
    /// Human-readable source label (the file name) for later display.
    pub label: String,
}

/// Whether the file name carries an allowed image extension.
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&e.as_str())
        })
        .unwrap_or(false)
}

/// Validate a user-chosen file path.
pub fn candidate_from_path(path: &Path) -> Result<IngestCandidate, ValidationError> {
    let label = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    if !is_image_file(path) {
        return Err(ValidationError::UnsupportedType { name: label });
    }

    Ok(IngestCandidate {
        path: path.to_path_buf(),
        label,
    })
}

/// Validate a drop payload. Only the first file is considered.
pub fn candidate_from_drop(paths: &[PathBuf]) -> Result<IngestCandidate, ValidationError> {
    let first = paths.first().ok_or(ValidationError::EmptyDrop)?;
    candidate_from_path(first)
}
