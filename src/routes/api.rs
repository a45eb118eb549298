use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::functions::system_prompt;
use crate::router::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub text: String,
}

/// The assistant widget. The prompt is rebuilt from live data on every call.
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if request.message.trim().is_empty() {
        return Err(AppError::BadRequest("Bitte stell eine Frage.".to_string()));
    }
    let config = state.store.load_config().await?;
    let participants = state.store.list_participants().await?;
    let prompt = system_prompt(&config, &participants);

    let text = state.ai.reply(request.message.trim(), &prompt).await;
    Ok(Json(ChatResponse { text }))
}
