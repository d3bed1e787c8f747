pub mod factor;
pub mod feature;
pub mod record;
pub mod result;

pub use factor::{EmissionFactor, EmissionFactorTable, FactorUnit, SourceKind};
pub use feature::FeatureVector;
pub use record::{coerce_f64, ConversionError, EnergyRecord, SuppliedFields};
pub use result::{
    Breakdown, EffortTier, EstimationResult, ImpactTier, Recommendation, SavingsMeasure,
};
