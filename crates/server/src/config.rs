use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Service configuration, read from `carbonsight.toml`. Every field has a
/// default so a missing file yields a working config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Base directory for the models/ and uploads/ subtrees.
    pub data_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            listen_addr: "0.0.0.0:8000".to_string(),
            data_dir: PathBuf::from("data"),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(raw) => match toml::from_str(&raw) {
                Ok(config) => config,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "unreadable config, using defaults");
                    ServerConfig::default()
                }
            },
            // A missing config file is the normal case.
            Err(_) => ServerConfig::default(),
        }
    }

    pub fn models_dir(&self) -> PathBuf {
        self.data_dir.join("models")
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.data_dir.join("uploads")
    }
}
