//! Cache Command Handlers

use std::sync::Arc;

use crate::application::commands::cache_commands::{ClearVolumeCommand, ClearVolumeResponse};
use crate::application::error::ApplicationError;
use crate::application::ports::AudioCachePort;

/// ClearVolume Handler - 删除 volume
///
/// volume 必须显式给出且存在
pub struct ClearVolumeHandler {
    audio_cache: Arc<dyn AudioCachePort>,
}

impl ClearVolumeHandler {
    pub fn new(audio_cache: Arc<dyn AudioCachePort>) -> Self {
        Self { audio_cache }
    }

    pub async fn handle(
        &self,
        cmd: ClearVolumeCommand,
    ) -> Result<ClearVolumeResponse, ApplicationError> {
        let volume = cmd.volume.trim();
        if volume.is_empty() {
            return Err(ApplicationError::validation("volume is required"));
        }

        let deleted = self.audio_cache.clear_volume(volume).await?;

        Ok(ClearVolumeResponse {
            volume: volume.to_string(),
            deleted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::{FileAudioCache, FileCacheConfig};
    use std::time::Duration;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_clear_volume() {
        let dir = TempDir::new().unwrap();
        let cache = FileAudioCache::new(FileCacheConfig {
            root: dir.path().to_path_buf(),
            ephemeral_age: Duration::from_secs(60),
        })
        .await
        .unwrap()
        .arc();
        cache.store("guid1", Some("v1"), ".mp3", b"a").await.unwrap();
        cache.store("guid2", Some("v1"), ".mp3", b"b").await.unwrap();
        let handler = ClearVolumeHandler::new(cache);

        let response = handler
            .handle(ClearVolumeCommand {
                volume: "v1".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(response.deleted, 2);

        let missing = handler
            .handle(ClearVolumeCommand {
                volume: "v1".to_string(),
            })
            .await;
        assert!(matches!(missing, Err(ApplicationError::NotFound { .. })));

        let empty = handler
            .handle(ClearVolumeCommand {
                volume: " ".to_string(),
            })
            .await;
        assert!(matches!(empty, Err(ApplicationError::ValidationError(_))));
    }
}
