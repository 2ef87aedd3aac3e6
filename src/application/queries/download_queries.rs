//! Download Queries - 下载构建查询

use crate::application::ports::DownloadMetadata;
use crate::domain::TaskSnapshot;

/// 查询构建进度
#[derive(Debug, Clone)]
pub struct DownloadStatusQuery {
    pub task_id: String,
}

#[derive(Debug, Clone)]
pub struct DownloadStatusResponse {
    pub task: TaskSnapshot,
    /// 构建结束后才有
    pub result: Option<DownloadMetadata>,
}

/// 获取构建好的音频
#[derive(Debug, Clone)]
pub struct GetDownloadAudioQuery {
    pub task_id: String,
}

#[derive(Debug, Clone)]
pub struct GetDownloadAudioResponse {
    pub audio_data: Vec<u8>,
    pub metadata: DownloadMetadata,
}
