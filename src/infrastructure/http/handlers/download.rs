//! Download Handlers
//!
//! 构建在后台进行：build 返回任务 id，客户端轮询 status，完成后取 audio

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::application::{BuildDownloadCommand, DownloadStatusQuery, GetDownloadAudioQuery};
use crate::domain::voice::AudioFormat;
use crate::infrastructure::http::dto::{
    ApiResponse, BuildDownloadDto, BuildDownloadRequest, DownloadStatusDto,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

pub async fn build_download(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BuildDownloadRequest>,
) -> Result<Json<ApiResponse<BuildDownloadDto>>, ApiError> {
    let format = req
        .format
        .as_deref()
        .map(str::parse::<AudioFormat>)
        .transpose()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let cmd = BuildDownloadCommand {
        label: req.label,
        tracks: req.tracks,
        languages: req.languages,
        voices: req.voices,
        format,
        max_seconds: req.max_seconds,
    };

    let result = state.build_download_handler.handle(cmd).await?;

    Ok(Json(ApiResponse::success(BuildDownloadDto {
        task_id: result.task_id,
        task: result.task,
    })))
}

pub async fn download_status(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> Result<Json<ApiResponse<DownloadStatusDto>>, ApiError> {
    let result = state
        .download_status_handler
        .handle(DownloadStatusQuery { task_id })?;

    Ok(Json(ApiResponse::success(DownloadStatusDto {
        task: result.task,
        result: result.result,
    })))
}

pub async fn download_audio(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> Result<Response, ApiError> {
    let result = state
        .get_download_audio_handler
        .handle(GetDownloadAudioQuery { task_id })
        .await?;

    let disposition = format!("attachment; filename=\"{}\"", result.metadata.filename);
    Ok((
        [
            (header::CONTENT_TYPE, result.metadata.content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        result.audio_data,
    )
        .into_response())
}
