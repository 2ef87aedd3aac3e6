//! Recorded Audio Port - 真人录音归档

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::voice::AudioFormat;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Archive error: {0}")]
    ServiceError(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Invalid archive url: {0}")]
    InvalidUrl(String),
}

impl ArchiveError {
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ArchiveError::NetworkError(_) | ArchiveError::Timeout | ArchiveError::ServiceError(_)
        )
    }
}

/// 录音定位
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedClipRequest {
    pub reader: String,
    pub document_id: String,
    pub segment_id: String,
    pub language: String,
    pub format: AudioFormat,
}

/// Recorded Audio Port
#[async_trait]
pub trait RecordedAudioPort: Send + Sync {
    /// 获取录音，不存在返回 None
    async fn fetch_recorded_clip(
        &self,
        request: &RecordedClipRequest,
    ) -> Result<Option<Vec<u8>>, ArchiveError>;
}
