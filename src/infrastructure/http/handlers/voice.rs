//! Voice Handlers

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::infrastructure::http::dto::{ApiResponse, VoiceDto};
use crate::infrastructure::http::state::AppState;

/// 列出目录中的音色
pub async fn list_voices(State(state): State<Arc<AppState>>) -> Json<ApiResponse<Vec<VoiceDto>>> {
    let voices = state
        .catalog
        .voices()
        .map(|voice| VoiceDto {
            name: voice.name().to_string(),
            language: voice.language().to_string(),
            locale: voice.locale().to_string(),
            human: voice.backend().is_human(),
            fallback: voice.fallback().map(|f| f.name().to_string()),
        })
        .collect();

    Json(ApiResponse::success(voices))
}
