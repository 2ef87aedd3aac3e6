//! Task Manager Port - 下载构建任务管理
//!
//! 定义任务注册与结果查询的抽象接口，具体实现在 infrastructure/memory 层

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::playlist::PlaylistStats;
use crate::domain::voice::AudioFormat;
use crate::domain::ProgressTask;

/// Task Manager 错误
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Task not found: {0}")]
    NotFound(String),

    #[error("Task already exists: {0}")]
    AlreadyExists(String),
}

/// 构建完成后的下载信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadMetadata {
    pub content_type: String,
    pub filename: String,
    pub guid: String,
    pub volume: String,
    pub format: AudioFormat,
    pub stats: PlaylistStats,
    pub build_timestamp: DateTime<Utc>,
    /// 构建失败时为错误信息，音频为错误提示
    pub error: Option<String>,
}

/// Task Manager Port
///
/// 所有状态存储在内存中
pub trait TaskManagerPort: Send + Sync {
    /// 注册任务
    fn register(&self, task: Arc<ProgressTask>) -> Result<(), TaskError>;

    fn get_task(&self, task_id: &str) -> Option<Arc<ProgressTask>>;

    /// 记录构建结果
    fn complete(&self, task_id: &str, metadata: DownloadMetadata) -> Result<(), TaskError>;

    fn get_result(&self, task_id: &str) -> Option<DownloadMetadata>;

    /// 删除早于 cutoff 的任务，返回删除数量
    fn cleanup_before(&self, cutoff: DateTime<Utc>) -> usize;
}
