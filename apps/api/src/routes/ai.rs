use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::auth::Session;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
    #[serde(default = "default_task")]
    pub task: String,
}

fn default_task() -> String {
    "text-generation".to_string()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub generated_text: String,
    pub task: String,
    pub model: String,
}

/// POST /api/v1/ai/generate
///
/// Thin proxy over the inference client. `task` is echoed back.
pub async fn handle_generate(
    State(state): State<AppState>,
    _session: Session,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    let generated_text = state.inference.generate(&req.prompt).await?;
    Ok(Json(GenerateResponse {
        generated_text,
        task: req.task,
        model: state.inference.model().to_string(),
    }))
}
