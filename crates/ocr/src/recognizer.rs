use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("image decode error: {0}")]
    ImageDecode(String),
    #[error("OCR engine error: {0}")]
    Engine(String),
    #[error("Tesseract not available — build with `tesseract` feature")]
    NotAvailable,
}

/// Abstraction over a text-recognition backend. Implementations accept
/// normalized PNG bytes and return the recognized text; the pipeline treats
/// any error as empty text rather than aborting the analysis.
pub trait OcrBackend: Send + Sync {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError>;
}

impl<T: OcrBackend + ?Sized> OcrBackend for Box<T> {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError> {
        (**self).recognize(image_bytes)
    }
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Returns a pre-set string — lets the extraction pipeline be exercised
/// without a Tesseract install.
pub struct MockRecognizer {
    pub text: String,
}

impl MockRecognizer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl OcrBackend for MockRecognizer {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<String, OcrError> {
        Ok(self.text.clone())
    }
}

// ── Tesseract backend (optional, gated behind `tesseract` feature) ─────────────

#[cfg(feature = "tesseract")]
pub mod tesseract_backend {
    use super::{OcrBackend, OcrError};
    use leptess::{LepTess, Variable};

    /// Bills are dominated by a single uniform block of text, so the engine
    /// runs with page-segmentation mode 6.
    const PAGE_SEG_MODE: &str = "6";

    pub struct TesseractRecognizer {
        data_path: Option<String>,
        lang: String,
    }

    impl TesseractRecognizer {
        pub fn new(data_path: Option<String>, lang: &str) -> Self {
            Self { data_path, lang: lang.to_string() }
        }
    }

    impl OcrBackend for TesseractRecognizer {
        fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError> {
            let mut lt = LepTess::new(self.data_path.as_deref(), &self.lang)
                .map_err(|e| OcrError::Engine(e.to_string()))?;
            lt.set_variable(Variable::TesseditPagesegMode, PAGE_SEG_MODE)
                .map_err(|e| OcrError::Engine(e.to_string()))?;
            lt.set_image_from_mem(image_bytes)
                .map_err(|e| OcrError::ImageDecode(e.to_string()))?;
            lt.get_utf8_text().map_err(|e| OcrError::Engine(e.to_string()))
        }
    }
}
