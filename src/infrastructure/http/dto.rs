//! Data Transfer Objects

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::application::ports::{CacheStats, DownloadMetadata, VolumeInfo};
use crate::domain::playlist::Track;
use crate::domain::TaskSnapshot;

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

// ============================================================================
// Download DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildDownloadRequest {
    pub label: String,
    pub tracks: Vec<Track>,
    #[serde(default)]
    pub languages: Option<Vec<String>>,
    /// 语言 → 音色名
    #[serde(default)]
    pub voices: BTreeMap<String, String>,
    /// "mp3"、"ogg"、"opus" 或 "wav"
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub max_seconds: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildDownloadDto {
    pub task_id: String,
    pub task: TaskSnapshot,
}

#[derive(Debug, Serialize)]
pub struct DownloadStatusDto {
    pub task: TaskSnapshot,
    pub result: Option<DownloadMetadata>,
}

// ============================================================================
// Cache DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct VolumesDto {
    pub volumes: Vec<VolumeInfo>,
    pub stats: CacheStats,
}

#[derive(Debug, Deserialize)]
pub struct ClearVolumeRequest {
    pub volume: String,
}

#[derive(Debug, Serialize)]
pub struct ClearVolumeDto {
    pub volume: String,
    pub deleted: usize,
}

// ============================================================================
// Voice DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct VoiceDto {
    pub name: String,
    pub language: String,
    pub locale: String,
    pub human: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
}
