//! Cache Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::AudioCachePort;
use crate::application::queries::cache_queries::{VolumeInfoQuery, VolumeInfoResponse};

/// VolumeInfo Handler - 各 volume 占用，不修改状态
pub struct VolumeInfoHandler {
    audio_cache: Arc<dyn AudioCachePort>,
}

impl VolumeInfoHandler {
    pub fn new(audio_cache: Arc<dyn AudioCachePort>) -> Self {
        Self { audio_cache }
    }

    pub async fn handle(
        &self,
        _query: VolumeInfoQuery,
    ) -> Result<VolumeInfoResponse, ApplicationError> {
        let volumes = self.audio_cache.volume_info().await?;
        Ok(VolumeInfoResponse {
            volumes: volumes.into_values().collect(),
            stats: self.audio_cache.stats(),
        })
    }
}
