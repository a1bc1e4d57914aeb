//! Recognition engine layer
//!
//! Locates the Tesseract data files and binds a recognition backend exactly
//! once at process startup. The resulting availability state is immutable
//! for the process lifetime: an engine never leaves `Ready` or `Unavailable`
//! once initialized, and an unavailable engine is only surfaced when the
//! user actually attempts an extraction.

#[cfg(feature = "tesseract")]
pub mod tesseract;

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Fixed recognition profile. No override is exposed.
pub const LANGUAGE: &str = "eng";
/// Page segmentation mode: automatic with orientation and script detection.
pub const PAGE_SEG_MODE: &str = "1";
/// Engine mode: LSTM only.
pub const ENGINE_MODE: &str = "1";

/// Well-known tessdata locations, checked in priority order. The relative
/// fallback resolves against the working directory.
pub const DATA_DIR_CANDIDATES: [&str; 4] = [
    "/opt/homebrew/share/tessdata",
    "/usr/local/share/tessdata",
    "/usr/share/tessdata",
    "tessdata",
];

/// Availability of the recognition engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EngineState {
    /// Initialization has not run.
    #[default]
    Uninitialized,
    /// A data directory was found and the backend handle was constructed.
    Ready,
    /// The engine cannot be used. `reason` is self-explanatory without a
    /// log lookup; `searched_paths` keeps the candidate list for diagnostics.
    Unavailable {
        reason: String,
        searched_paths: Vec<PathBuf>,
    },
}

impl EngineState {
    pub fn is_ready(&self) -> bool {
        matches!(self, EngineState::Ready)
    }
}

/// A recognition backend converts encoded raster image bytes into text.
///
/// Implementations must be shareable with the background extraction thread.
pub trait RecognitionBackend: Send + Sync {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String>;
}

/// The engine: availability state plus the backend handle when ready.
///
/// Owned by whoever ran initialization and shared read-only afterwards;
/// nothing mutates engine configuration post-initialization.
pub struct Engine {
    state: EngineState,
    backend: Option<Box<dyn RecognitionBackend>>,
}

impl Engine {
    /// Locate a data directory and construct the default backend.
    ///
    /// Called exactly once per process; never retried. A user-configured
    /// directory, when given, is checked before the well-known locations.
    pub fn initialize(extra_data_dir: Option<&Path>) -> Self {
        let mut candidates: Vec<PathBuf> = Vec::new();
        if let Some(dir) = extra_data_dir {
            candidates.push(dir.to_path_buf());
        }
        candidates.extend(DATA_DIR_CANDIDATES.iter().map(PathBuf::from));
        Self::initialize_with(&candidates, default_backend)
    }

    /// Initialize against an explicit candidate list and backend factory.
    ///
    /// The first candidate that exists and is a directory wins; later
    /// candidates are ignored even if they also exist.
    pub fn initialize_with(
        candidates: &[PathBuf],
        factory: impl FnOnce(&Path) -> Result<Box<dyn RecognitionBackend>>,
    ) -> Self {
        let Some(data_dir) = candidates.iter().find(|p| p.is_dir()) else {
            let reason = format!(
                "Tessdata directory not found. Searched paths: {}",
                candidates
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            warn!("{reason}");
            return Self {
                state: EngineState::Unavailable {
                    reason,
                    searched_paths: candidates.to_vec(),
                },
                backend: None,
            };
        };

        info!("Using tessdata path: {}", data_dir.display());

        match factory(data_dir) {
            Ok(backend) => {
                info!("Recognition engine initialized successfully");
                Self {
                    state: EngineState::Ready,
                    backend: Some(backend),
                }
            }
            Err(e) => {
                let reason = format!("Failed to construct recognition engine: {e:#}");
                warn!("{reason}");
                Self {
                    state: EngineState::Unavailable {
                        reason,
                        searched_paths: candidates.to_vec(),
                    },
                    backend: None,
                }
            }
        }
    }

    /// Wrap an already-constructed backend in a ready engine.
    #[cfg(test)]
    pub fn with_backend(backend: Box<dyn RecognitionBackend>) -> Self {
        Self {
            state: EngineState::Ready,
            backend: Some(backend),
        }
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn backend(&self) -> Option<&dyn RecognitionBackend> {
        self.backend.as_deref()
    }
}

#[cfg(feature = "tesseract")]
fn default_backend(data_dir: &Path) -> Result<Box<dyn RecognitionBackend>> {
    Ok(Box::new(tesseract::TessBackend::new(data_dir)?))
}

#[cfg(not(feature = "tesseract"))]
fn default_backend(_data_dir: &Path) -> Result<Box<dyn RecognitionBackend>> {
    anyhow::bail!("recognition engine support not compiled in (build with the `tesseract` feature)")
}

#[cfg(test)]
pub(crate) mod testing {
    //! Backends for exercising the pipeline without Tesseract installed.

    use super::RecognitionBackend;
    use anyhow::{anyhow, Result};
    use crossbeam_channel::Receiver;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Returns a preset string without touching the image bytes and counts
    /// how often it was invoked.
    pub struct MockBackend {
        text: String,
        calls: Arc<AtomicUsize>,
    }

    impl MockBackend {
        pub fn new(text: impl Into<String>) -> Self {
            Self {
                text: text.into(),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub fn call_counter(&self) -> Arc<AtomicUsize> {
            self.calls.clone()
        }
    }

    impl RecognitionBackend for MockBackend {
        fn recognize(&self, _image_bytes: &[u8]) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.text.clone())
        }
    }

    /// Fails every call with the given message.
    pub struct FailingBackend {
        pub message: String,
    }

    impl RecognitionBackend for FailingBackend {
        fn recognize(&self, _image_bytes: &[u8]) -> Result<String> {
            Err(anyhow!("{}", self.message))
        }
    }

    /// Blocks inside `recognize` until the gate channel yields, then returns
    /// the preset text. Lets tests hold a task in the running state.
    pub struct GatedBackend {
        pub gate: Receiver<()>,
        pub text: String,
    }

    impl RecognitionBackend for GatedBackend {
        fn recognize(&self, _image_bytes: &[u8]) -> Result<String> {
            self.gate
                .recv()
                .map_err(|_| anyhow!("gate closed before release"))?;
            Ok(self.text.clone())
        }
    }
}
