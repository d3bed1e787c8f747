use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use carbonsight_core::EmissionFactorTable;
use carbonsight_engine::EngineContext;
use carbonsight_model::ModelStore;
use carbonsight_ocr::{BillPipeline, OcrBackend};

mod config;
mod routes;
mod upload;

use config::ServerConfig;
use routes::AppState;

const CONFIG_PATH: &str = "carbonsight.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = ServerConfig::load(Path::new(CONFIG_PATH));
    std::fs::create_dir_all(config.models_dir())
        .context("failed to create models directory")?;
    std::fs::create_dir_all(config.uploads_dir())
        .context("failed to create uploads directory")?;

    // A persisted model takes precedence; otherwise this fits and stores the
    // seeded default.
    let predictor = ModelStore::new(config.models_dir()).load_or_bootstrap();
    let engine = Arc::new(EngineContext::new(EmissionFactorTable::new(), predictor));

    let state = Arc::new(AppState {
        engine: engine.clone(),
        pipeline: BillPipeline::new(build_recognizer(), engine),
        uploads_dir: config.uploads_dir(),
    });

    let app = routes::router(state, config.max_upload_bytes);
    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!(addr = %config.listen_addr, "carbonsight service listening");
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(feature = "tesseract")]
fn build_recognizer() -> Box<dyn OcrBackend> {
    use carbonsight_ocr::recognizer::tesseract_backend::TesseractRecognizer;
    Box::new(TesseractRecognizer::new(None, "eng"))
}

#[cfg(not(feature = "tesseract"))]
fn build_recognizer() -> Box<dyn OcrBackend> {
    // Without the tesseract feature, uploads still flow through the pipeline
    // but recognition yields empty text and zero-confidence extractions.
    Box::new(carbonsight_ocr::MockRecognizer::new(""))
}
