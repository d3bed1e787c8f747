use serde_json::Value;
use tracing::warn;

use carbonsight_core::{Breakdown, EnergyRecord, EstimationResult, FeatureVector};

use crate::advice::{recommendations_for_quantity, savings_potential};
use crate::context::EngineContext;

impl EngineContext {
    /// Blend the deterministic formula estimate with the model estimate.
    /// The final figure is their unweighted mean — a deliberate simple
    /// ensembling policy, not a learned blend.
    pub fn estimate(&self, record: &EnergyRecord) -> EstimationResult {
        let factor = self.factors().lookup(record.source_kind);
        let formula = record.consumption_quantity * factor.coefficient;

        let features = FeatureVector::from_record(record);
        let model = self.predictor().predict(&features);

        let co2 = (formula + model) / 2.0;

        EstimationResult {
            co2_kg: round2(co2),
            confidence: confidence_score(record),
            breakdown: Some(Breakdown {
                energy_type: record.source_kind,
                consumption: record.consumption_quantity,
                emission_factor: factor.coefficient,
                formula_estimate: round2(formula),
                model_estimate: round2(model),
            }),
            savings_potential: savings_potential(self.factors(), record.consumption_quantity),
            recommendations: recommendations_for_quantity(record.consumption_quantity),
            error: None,
        }
    }

    /// Estimate from the caller's unstructured map. Conversion failures are
    /// absorbed into a zero-confidence result carrying the description —
    /// callers always receive a structurally valid result.
    pub fn estimate_from_json(&self, input: &Value) -> EstimationResult {
        match EnergyRecord::from_json(input) {
            Ok(record) => self.estimate(&record),
            Err(e) => {
                warn!(error = %e, "estimation input rejected, returning degraded result");
                EstimationResult::degraded(e.to_string())
            }
        }
    }
}

/// Rewards caller-supplied data richness, not estimate accuracy: base 0.5,
/// +0.2 for a positive quantity, +0.1 per explicitly supplied field.
fn confidence_score(record: &EnergyRecord) -> f64 {
    let mut confidence: f64 = 0.5;
    if record.consumption_quantity > 0.0 {
        confidence += 0.2;
    }
    if record.supplied.source_kind {
        confidence += 0.1;
    }
    if record.supplied.household_size {
        confidence += 0.1;
    }
    if record.supplied.region {
        confidence += 0.1;
    }
    confidence.clamp(0.0, 1.0)
}

pub(crate) fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

pub(crate) fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

pub(crate) fn round0(x: f64) -> f64 {
    x.round()
}

#[cfg(test)]
mod tests {
    use super::*;
    use carbonsight_core::{EmissionFactorTable, SourceKind};
    use carbonsight_model::RegressionPredictor;
    use serde_json::json;
    use std::sync::OnceLock;

    fn ctx() -> &'static EngineContext {
        static CTX: OnceLock<EngineContext> = OnceLock::new();
        CTX.get_or_init(|| {
            EngineContext::new(EmissionFactorTable::new(), RegressionPredictor::bootstrap_default())
        })
    }

    #[test]
    fn co2_is_mean_of_formula_and_model() {
        for quantity in [0.0, 100.0, 850.0, 1999.0] {
            let result = ctx().estimate_from_json(&json!({"kWh": quantity}));
            let b = result.breakdown.as_ref().unwrap();
            let mean = (b.formula_estimate + b.model_estimate) / 2.0;
            assert!(
                (result.co2_kg - mean).abs() <= 0.011,
                "q={quantity}: co2 {} vs mean {mean}",
                result.co2_kg
            );
            assert!(result.co2_kg >= 0.0);
        }
    }

    #[test]
    fn formula_estimate_uses_declared_source_factor() {
        let result = ctx().estimate_from_json(&json!({"kWh": 1000.0, "type": "natural_gas"}));
        let b = result.breakdown.unwrap();
        assert_eq!(b.energy_type, SourceKind::NaturalGas);
        assert_eq!(b.emission_factor, 0.202);
        assert_eq!(b.formula_estimate, 202.0);
    }

    #[test]
    fn confidence_rewards_supplied_fields() {
        assert_eq!(ctx().estimate_from_json(&json!({})).confidence, 0.5);
        assert_eq!(ctx().estimate_from_json(&json!({"kWh": 0})).confidence, 0.5);
        assert_eq!(ctx().estimate_from_json(&json!({"kWh": 100})).confidence, 0.7);
        assert_eq!(
            ctx()
                .estimate_from_json(&json!({"kWh": 100, "type": "solar"}))
                .confidence,
            0.8
        );
        assert_eq!(
            ctx()
                .estimate_from_json(&json!({"kWh": 100, "type": "solar", "household_size": 3}))
                .confidence,
            0.9
        );
        assert_eq!(
            ctx()
                .estimate_from_json(&json!({
                    "kWh": 100, "type": "solar", "household_size": 3, "region": "US"
                }))
                .confidence,
            1.0
        );
    }

    #[test]
    fn confidence_is_monotone_and_bounded() {
        let inputs = [
            json!({}),
            json!({"kWh": 50}),
            json!({"kWh": 50, "type": "coal"}),
            json!({"kWh": 50, "type": "coal", "household_size": 1}),
            json!({"kWh": 50, "type": "coal", "household_size": 1, "region": "EU"}),
        ];
        let mut last = 0.0;
        for input in &inputs {
            let c = ctx().estimate_from_json(input).confidence;
            assert!((0.0..=1.0).contains(&c));
            assert!(c >= last, "confidence dropped: {c} < {last}");
            last = c;
        }
    }

    #[test]
    fn savings_stay_grid_priced_for_non_grid_sources() {
        // A solar record's savings are still priced at 0.416, not 0.041.
        let result = ctx().estimate_from_json(&json!({"kWh": 1000.0, "type": "solar"}));
        let led = &result.savings_potential[0];
        assert_eq!(led.quantity_saved, 150.0);
        assert_eq!(led.co2_saved, 62.4);
    }

    #[test]
    fn non_numeric_quantity_degrades_instead_of_failing() {
        let result = ctx().estimate_from_json(&json!({"kWh": "several"}));
        assert_eq!(result.co2_kg, 0.0);
        assert_eq!(result.confidence, 0.0);
        assert!(result.error.unwrap().contains("kWh"));
    }

    #[test]
    fn non_object_payload_degrades() {
        let result = ctx().estimate_from_json(&json!("just a string"));
        assert_eq!(result.confidence, 0.0);
        assert!(result.error.is_some());
    }

    #[test]
    fn recommendations_for_partial_profile() {
        assert_eq!(ctx().recommendations_for(&json!({"kWh": 1200})).len(), 3);
        assert_eq!(ctx().recommendations_for(&json!({})).len(), 1);
        // Unparsable quantities count as zero instead of failing.
        assert_eq!(ctx().recommendations_for(&json!({"kWh": "n/a"})).len(), 1);
    }

    #[test]
    fn rounding_helpers() {
        assert_eq!(round2(62.399999), 62.4);
        assert_eq!(round1(149.96), 150.0);
        assert_eq!(round0(180.4), 180.0);
    }
}
