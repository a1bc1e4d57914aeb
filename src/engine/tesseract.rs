//! Tesseract recognition backend via leptess.
//!
//! `LepTess` holds raw pointers and cannot be shared across threads, so the
//! backend keeps only the bound configuration and constructs a handle per
//! call. Construction is probed once at startup so a broken installation
//! reports as unavailable instead of failing the first extraction.

use anyhow::{Context, Result};
use leptess::{LepTess, Variable};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{RecognitionBackend, ENGINE_MODE, LANGUAGE, PAGE_SEG_MODE};

pub struct TessBackend {
    data_dir: PathBuf,
}

impl TessBackend {
    /// Bind the data directory, probing handle construction once.
    pub fn new(data_dir: &Path) -> Result<Self> {
        let backend = Self {
            data_dir: data_dir.to_path_buf(),
        };
        backend.handle()?;
        Ok(backend)
    }

    fn handle(&self) -> Result<LepTess> {
        let datapath = self
            .data_dir
            .to_str()
            .context("tessdata path is not valid UTF-8")?;
        let mut lt = LepTess::new(Some(datapath), LANGUAGE).with_context(|| {
            format!(
                "failed to initialize Tesseract with data path {}",
                self.data_dir.display()
            )
        })?;
        lt.set_variable(Variable::TesseditPagesegMode, PAGE_SEG_MODE)
            .context("failed to set page segmentation mode")?;
        lt.set_variable(Variable::TesseditOcrEngineMode, ENGINE_MODE)
            .context("failed to set OCR engine mode")?;
        Ok(lt)
    }
}

impl RecognitionBackend for TessBackend {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String> {
        let mut lt = self.handle()?;
        lt.set_image_from_mem(image_bytes)
            .context("Tesseract could not read the image data")?;
        debug!("running recognition on {} byte image", image_bytes.len());
        lt.get_utf8_text().context("Tesseract recognition failed")
    }
}
