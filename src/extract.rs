//! Text extraction service
//!
//! One stateless recognition call: checks engine availability, verifies the
//! bytes decode to a raster image, then delegates to the backend. Purely
//! functional given a ready engine and valid bytes.

use thiserror::Error;
use tracing::debug;

use crate::engine::{Engine, EngineState};

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("OCR not available: {reason}")]
    EngineUnavailable { reason: String },
    #[error("could not decode image data from {source_label}")]
    Decode {
        source_label: String,
        #[source]
        source: image::ImageError,
    },
    #[error("text recognition failed for {source_label}")]
    Recognition {
        source_label: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ExtractError {
    /// Short taxonomy name, used in diagnostics reports.
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractError::EngineUnavailable { .. } => "EngineUnavailable",
            ExtractError::Decode { .. } => "DecodeError",
            ExtractError::Recognition { .. } => "RecognitionError",
        }
    }

    /// Kind name of the attached cause, where the variant fixes its type.
    pub fn cause_kind(&self) -> Option<&'static str> {
        match self {
            ExtractError::EngineUnavailable { .. } => None,
            ExtractError::Decode { .. } => Some("ImageError"),
            ExtractError::Recognition { .. } => Some("BackendError"),
        }
    }
}

/// Run one recognition call against `engine`.
///
/// A non-ready engine fails immediately with the stored reason; no attempt
/// is made to re-initialize, decode, or delegate.
pub fn extract(
    engine: &Engine,
    source_label: &str,
    raw_image: &[u8],
) -> Result<String, ExtractError> {
    match engine.state() {
        EngineState::Ready => {}
        EngineState::Uninitialized => {
            return Err(ExtractError::EngineUnavailable {
                reason: "engine not initialized".to_string(),
            });
        }
        EngineState::Unavailable { reason, .. } => {
            return Err(ExtractError::EngineUnavailable {
                reason: reason.clone(),
            });
        }
    }

    let decoded = image::load_from_memory(raw_image).map_err(|e| ExtractError::Decode {
        source_label: source_label.to_string(),
        source: e,
    })?;
    debug!(
        "processing image from {source_label} ({}x{})",
        decoded.width(),
        decoded.height()
    );

    let backend = engine
        .backend()
        .ok_or_else(|| ExtractError::EngineUnavailable {
            reason: "no recognition backend bound".to_string(),
        })?;

    let text = backend
        .recognize(raw_image)
        .map_err(|e| ExtractError::Recognition {
            source_label: source_label.to_string(),
            source: e.into(),
        })?;

    debug!("recognition completed for {source_label}");
    Ok(text)
}
