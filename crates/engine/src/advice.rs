use serde_json::Value;

use carbonsight_core::{
    coerce_f64, EffortTier, EmissionFactorTable, ImpactTier, Recommendation, SavingsMeasure,
};

use crate::context::EngineContext;
use crate::estimate::{round0, round1, round2};

struct MeasureSpec {
    id: &'static str,
    fraction: f64,
    effort: EffortTier,
}

/// The three fixed efficiency measures, in presentation order.
const MEASURES: [MeasureSpec; 3] = [
    MeasureSpec { id: "led_lighting", fraction: 0.15, effort: EffortTier::Easy },
    MeasureSpec { id: "smart_thermostat", fraction: 0.12, effort: EffortTier::Medium },
    MeasureSpec { id: "efficient_appliances", fraction: 0.20, effort: EffortTier::Hard },
];

/// Savings are always priced at the grid coefficient, whatever source the
/// record declared — an intentional simplification.
pub(crate) fn savings_potential(
    factors: &EmissionFactorTable,
    quantity: f64,
) -> Vec<SavingsMeasure> {
    let grid = factors.grid_coefficient();
    MEASURES
        .iter()
        .map(|m| {
            let saved = quantity * m.fraction;
            SavingsMeasure {
                measure: m.id.to_string(),
                quantity_saved: round1(saved),
                co2_saved: round2(saved * grid),
                effort: m.effort,
            }
        })
        .collect()
}

/// Threshold rules, in order: the high-usage warning leads when consumption
/// warrants it, the LED upgrade follows above the lower threshold, and the
/// smart-thermostat advisory always closes the list.
pub(crate) fn recommendations_for_quantity(quantity: f64) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if quantity > 1000.0 {
        recommendations.push(Recommendation {
            title: "High Energy Usage Detected".to_string(),
            description: "Consider upgrading to energy-efficient appliances".to_string(),
            impact: ImpactTier::High,
            effort: EffortTier::Medium,
            monthly_savings_kwh: round0(quantity * 0.20),
        });
    }

    if quantity > 500.0 {
        recommendations.push(Recommendation {
            title: "LED Lighting Upgrade".to_string(),
            description: "Replace incandescent bulbs with LED lighting".to_string(),
            impact: ImpactTier::Medium,
            effort: EffortTier::Easy,
            monthly_savings_kwh: round0(quantity * 0.15),
        });
    }

    recommendations.push(Recommendation {
        title: "Smart Thermostat".to_string(),
        description: "Install a programmable smart thermostat".to_string(),
        impact: ImpactTier::Medium,
        effort: EffortTier::Medium,
        monthly_savings_kwh: round0(quantity * 0.12),
    });

    recommendations
}

impl EngineContext {
    /// The narrower entry point: recommendations only, from a partial
    /// profile. An absent or unparsable quantity counts as zero rather than
    /// failing.
    pub fn recommendations_for(&self, profile: &Value) -> Vec<Recommendation> {
        let quantity = profile
            .get("kWh")
            .and_then(coerce_f64)
            .unwrap_or(0.0)
            .max(0.0);
        recommendations_for_quantity(quantity)
    }
}
