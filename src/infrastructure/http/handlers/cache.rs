//! Cache Handlers

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::{ClearVolumeCommand, VolumeInfoQuery};
use crate::infrastructure::http::dto::{ApiResponse, ClearVolumeDto, ClearVolumeRequest, VolumesDto};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

pub async fn list_volumes(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<VolumesDto>>, ApiError> {
    let result = state.volume_info_handler.handle(VolumeInfoQuery).await?;

    Ok(Json(ApiResponse::success(VolumesDto {
        volumes: result.volumes,
        stats: result.stats,
    })))
}

pub async fn clear_volume(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ClearVolumeRequest>,
) -> Result<Json<ApiResponse<ClearVolumeDto>>, ApiError> {
    let result = state
        .clear_volume_handler
        .handle(ClearVolumeCommand { volume: req.volume })
        .await?;

    Ok(Json(ApiResponse::success(ClearVolumeDto {
        volume: result.volume,
        deleted: result.deleted,
    })))
}
