use carbonsight_core::EmissionFactorTable;
use carbonsight_model::RegressionPredictor;

/// Process-wide estimation context: the factor table and the fitted model.
/// Built once at startup, read-only afterwards; operations borrow it, so
/// concurrent estimation calls need no synchronization.
#[derive(Debug)]
pub struct EngineContext {
    factors: EmissionFactorTable,
    predictor: RegressionPredictor,
}

impl EngineContext {
    pub fn new(factors: EmissionFactorTable, predictor: RegressionPredictor) -> Self {
        EngineContext { factors, predictor }
    }

    pub fn factors(&self) -> &EmissionFactorTable {
        &self.factors
    }

    pub fn predictor(&self) -> &RegressionPredictor {
        &self.predictor
    }
}
