use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::predictor::RegressionPredictor;

pub const MODEL_FILE_NAME: &str = "carbon_model.json";

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model artifact IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("model artifact is not a valid fitted model: {0}")]
    Format(#[from] serde_json::Error),
}

/// Reads and writes the single fitted-model artifact under a models
/// directory. The artifact is only ever produced and consumed by this
/// process; the bootstrap procedure, not the file format, is the
/// compatibility contract.
#[derive(Debug, Clone)]
pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        ModelStore { dir: dir.into() }
    }

    pub fn artifact_path(&self) -> PathBuf {
        self.dir.join(MODEL_FILE_NAME)
    }

    pub fn load(&self) -> Result<RegressionPredictor, ModelError> {
        let raw = fs::read_to_string(self.artifact_path())?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn save(&self, predictor: &RegressionPredictor) -> Result<(), ModelError> {
        fs::create_dir_all(&self.dir)?;
        let raw = serde_json::to_string(predictor)?;
        fs::write(self.artifact_path(), raw)?;
        Ok(())
    }

    /// A previously persisted model takes precedence; anything short of a
    /// clean load falls back to the seeded bootstrap, which is then persisted
    /// for the next startup. Never fails.
    pub fn load_or_bootstrap(&self) -> RegressionPredictor {
        if self.artifact_path().exists() {
            match self.load() {
                Ok(predictor) => {
                    info!(path = %self.artifact_path().display(), "loaded fitted carbon model");
                    return predictor;
                }
                Err(e) => {
                    warn!(error = %e, "stored carbon model unreadable, refitting default");
                }
            }
        }

        let predictor = RegressionPredictor::bootstrap_default();
        info!("fitted default carbon model from synthetic bootstrap");
        if let Err(e) = self.save(&predictor) {
            warn!(error = %e, "could not persist carbon model artifact");
        }
        predictor
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
