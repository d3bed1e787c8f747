pub mod predictor;
pub mod store;
pub mod tree;

pub use predictor::{RegressionPredictor, BOOTSTRAP_SAMPLES, BOOTSTRAP_SEED, ENSEMBLE_SIZE};
pub use store::{ModelError, ModelStore, MODEL_FILE_NAME};
pub use tree::{Forest, RegressionTree};
