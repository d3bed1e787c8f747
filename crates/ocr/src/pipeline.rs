use std::sync::Arc;
use tracing::warn;

use carbonsight_core::{EnergyRecord, EstimationResult, SourceKind};
use carbonsight_engine::EngineContext;

use crate::extract::BillExtractor;
use crate::hash;
use crate::preprocess;
use crate::recognizer::OcrBackend;
use crate::types::ExtractedBillData;

/// Callers only ever see the head of the recognized text; extraction always
/// runs on the full text first. Payload-size guard, not a parsing guard.
pub const TEXT_EXCERPT_CHARS: usize = 500;

/// The result of analyzing one uploaded bill image.
#[derive(Debug)]
pub struct BillAnalysis {
    /// SHA-256 hex digest of the original upload, for log correlation.
    pub trace_id: String,
    pub text_excerpt: String,
    pub extracted: ExtractedBillData,
    /// Present only when a positive consumption quantity was extracted.
    pub estimation: Option<EstimationResult>,
}

/// Orchestrates normalize → recognize → extract → estimate for one image,
/// in strict sequence. Decode and recognition failures degrade to empty
/// text; the analysis itself never fails.
pub struct BillPipeline<R: OcrBackend> {
    recognizer: R,
    engine: Arc<EngineContext>,
}

impl<R: OcrBackend> BillPipeline<R> {
    pub fn new(recognizer: R, engine: Arc<EngineContext>) -> Self {
        Self { recognizer, engine }
    }

    pub fn process_bytes(&self, data: &[u8]) -> BillAnalysis {
        let trace_id = hash::to_hex(&hash::sha256_bytes(data));

        let text = match preprocess::prepare_for_ocr_from_bytes(data) {
            Ok(normalized) => match self.recognizer.recognize(&normalized) {
                Ok(text) => text,
                Err(e) => {
                    warn!(%trace_id, error = %e, "recognition failed, continuing with empty text");
                    String::new()
                }
            },
            Err(e) => {
                warn!(%trace_id, error = %e, "image preprocessing failed, continuing with empty text");
                String::new()
            }
        };

        let extracted = BillExtractor::extract(&text);

        let estimation = if extracted.consumption_kwh > 0.0 {
            let record = EnergyRecord::from_consumption(
                extracted.consumption_kwh,
                SourceKind::ElectricityGrid,
            );
            Some(self.engine.estimate(&record))
        } else {
            None
        };

        BillAnalysis {
            trace_id,
            text_excerpt: text.chars().take(TEXT_EXCERPT_CHARS).collect(),
            extracted,
            estimation,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
