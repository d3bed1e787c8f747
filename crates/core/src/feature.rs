use serde::{Deserialize, Serialize};

use crate::record::EnergyRecord;

/// Placeholder until a per-region mapping is learned from observed data.
pub const REGION_FACTOR: f64 = 1.0;
/// Placeholder appliance-efficiency factor, same caveat.
pub const EFFICIENCY_FACTOR: f64 = 0.8;

/// The fixed feature layout the regression model was fit against:
/// `[consumption_quantity, household_size, region_factor, efficiency_factor]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(pub [f64; 4]);

impl FeatureVector {
    pub fn new(quantity: f64, household_size: f64, region: f64, efficiency: f64) -> Self {
        FeatureVector([quantity, household_size, region, efficiency])
    }

    /// Derive features from a record. Region and efficiency stay at their
    /// constant placeholders regardless of the record's region string.
    pub fn from_record(record: &EnergyRecord) -> Self {
        FeatureVector([
            record.consumption_quantity,
            record.household_size as f64,
            REGION_FACTOR,
            EFFICIENCY_FACTOR,
        ])
    }

    pub fn quantity(&self) -> f64 {
        self.0[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factor::SourceKind;

    #[test]
    fn from_record_uses_placeholder_factors() {
        let record = EnergyRecord::from_consumption(1200.0, SourceKind::Coal);
        let fv = FeatureVector::from_record(&record);
        assert_eq!(fv.0, [1200.0, 2.0, 1.0, 0.8]);
    }
}
