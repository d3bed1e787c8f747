pub mod extract;
pub mod hash;
pub mod pipeline;
pub mod preprocess;
pub mod recognizer;
pub mod types;

pub use extract::BillExtractor;
pub use hash::{sha256_bytes, to_hex};
pub use pipeline::{BillAnalysis, BillPipeline, TEXT_EXCERPT_CHARS};
pub use preprocess::{prepare_for_ocr_from_bytes, PreprocessError};
pub use recognizer::{MockRecognizer, OcrBackend, OcrError};
pub use types::ExtractedBillData;
