use serde::{Deserialize, Serialize};

/// Structured fields recovered from one bill's recognized text. Unmatched
/// fields keep their zero/empty defaults; confidence is the clamped sum of
/// per-field contributions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedBillData {
    pub consumption_kwh: f64,
    pub amount: f64,
    /// "start - end" when at least two date-shaped substrings were found.
    pub service_period: String,
    pub provider: String,
    pub confidence: f32,
}
