//! Audio Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{AudioCachePort, TaskManagerPort};
use crate::application::queries::download_queries::{
    GetDownloadAudioQuery, GetDownloadAudioResponse,
};

/// GetDownloadAudio Handler - 获取构建好的音频
///
/// 音频按结果中的 guid 从缓存读取；临时条目被清理后返回 NotFound
pub struct GetDownloadAudioHandler {
    audio_cache: Arc<dyn AudioCachePort>,
    task_manager: Arc<dyn TaskManagerPort>,
}

impl GetDownloadAudioHandler {
    pub fn new(
        audio_cache: Arc<dyn AudioCachePort>,
        task_manager: Arc<dyn TaskManagerPort>,
    ) -> Self {
        Self {
            audio_cache,
            task_manager,
        }
    }

    pub async fn handle(
        &self,
        query: GetDownloadAudioQuery,
    ) -> Result<GetDownloadAudioResponse, ApplicationError> {
        let Some(metadata) = self.task_manager.get_result(&query.task_id) else {
            return match self.task_manager.get_task(&query.task_id) {
                Some(task) => Err(ApplicationError::invalid_state(format!(
                    "build {} is {}",
                    query.task_id,
                    task.state().as_str()
                ))),
                None => Err(ApplicationError::not_found("Task", query.task_id)),
            };
        };

        let audio_data = self
            .audio_cache
            .retrieve(
                &metadata.guid,
                Some(&metadata.volume),
                &metadata.format.suffix(),
            )
            .await?
            .ok_or_else(|| ApplicationError::not_found("Audio", metadata.guid.clone()))?;

        Ok(GetDownloadAudioResponse {
            audio_data,
            metadata,
        })
    }
}
