//! Chat endpoint - free-form questions answered by the language model

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::advisor::markup::format_response;
use crate::advisor::prompt::{build_chat_prompt, ChatContext};
use crate::advisor::upstream::GenerationConfig;
use crate::server::error::ApiError;
use crate::server::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub context: Option<ChatContext>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// HTML fragment
    pub reply: String,
}

/// POST /chat - Answer a question, optionally about a diagnosed plant
pub async fn chat(
    State(state): State<SharedState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::rejected(e.status(), e.body_text()))?;

    let message = request
        .message
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| ApiError::validation("No message provided"))?;

    info!(
        "Chat request ({} chars, context: {})",
        message.len(),
        request.context.is_some()
    );
    let prompt = build_chat_prompt(&message, request.context.as_ref());
    let reply = state
        .llm
        .generate(&prompt, Some(&GenerationConfig::chat()))
        .await?;

    Ok(Json(ChatResponse {
        reply: format_response(&reply),
    }))
}
