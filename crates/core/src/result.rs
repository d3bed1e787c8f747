use serde::{Deserialize, Serialize};
use std::fmt;

use crate::factor::SourceKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffortTier {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for EffortTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EffortTier::Easy => write!(f, "Easy"),
            EffortTier::Medium => write!(f, "Medium"),
            EffortTier::Hard => write!(f, "Hard"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImpactTier {
    High,
    Medium,
    Low,
}

/// One efficiency measure and what adopting it would save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsMeasure {
    pub measure: String,
    /// Consumption units saved per month (kWh for grid-priced measures).
    pub quantity_saved: f64,
    pub co2_saved: f64,
    pub effort: EffortTier,
}

/// An advisory record surfaced to the caller. Order within the list is
/// significant and preserved as produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub description: String,
    pub impact: ImpactTier,
    pub effort: EffortTier,
    /// Whole kWh per month the measure is expected to save.
    pub monthly_savings_kwh: f64,
}

/// How the final number was reached: the deterministic formula estimate and
/// the model estimate it was averaged with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    pub energy_type: SourceKind,
    pub consumption: f64,
    pub emission_factor: f64,
    pub formula_estimate: f64,
    pub model_estimate: f64,
}

/// The outcome of one estimation call. Always structurally valid: degraded
/// inputs produce a zero-confidence result with `error` set, never a failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimationResult {
    pub co2_kg: f64,
    pub confidence: f64,
    pub breakdown: Option<Breakdown>,
    pub savings_potential: Vec<SavingsMeasure>,
    pub recommendations: Vec<Recommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EstimationResult {
    /// The zero-emission, zero-confidence shape returned when input could not
    /// be converted. Carries the description instead of propagating it.
    pub fn degraded(error: impl Into<String>) -> Self {
        EstimationResult {
            co2_kg: 0.0,
            confidence: 0.0,
            breakdown: None,
            savings_potential: Vec::new(),
            recommendations: Vec::new(),
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degraded_result_is_structurally_valid() {
        let r = EstimationResult::degraded("non-numeric value for 'kWh'");
        assert_eq!(r.co2_kg, 0.0);
        assert_eq!(r.confidence, 0.0);
        assert!(r.breakdown.is_none());
        assert!(r.savings_potential.is_empty());
        assert!(r.recommendations.is_empty());
        assert!(r.error.unwrap().contains("kWh"));
    }

    #[test]
    fn degraded_result_omits_error_field_only_when_absent() {
        let json = serde_json::to_value(EstimationResult::degraded("boom")).unwrap();
        assert_eq!(json["error"], "boom");

        let ok = EstimationResult { error: None, ..EstimationResult::degraded("") };
        let json = serde_json::to_value(ok).unwrap();
        assert!(json.get("error").is_none());
    }

    #[test]
    fn effort_tier_display() {
        assert_eq!(EffortTier::Easy.to_string(), "Easy");
        assert_eq!(EffortTier::Hard.to_string(), "Hard");
    }
}
