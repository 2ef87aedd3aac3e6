//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;

use crate::application::{
    // Command handlers
    BuildDownloadHandler, ClearVolumeHandler, DownloadSettings,
    // Query handlers
    DownloadStatusHandler, GetDownloadAudioHandler, VolumeInfoHandler,
    // Ports
    AudioCachePort, PlaylistAssembler, TaskManagerPort,
};
use crate::domain::voice::VoiceCatalog;

/// 应用状态
pub struct AppState {
    pub catalog: Arc<VoiceCatalog>,

    // ========== Command Handlers ==========
    pub build_download_handler: BuildDownloadHandler,
    pub clear_volume_handler: ClearVolumeHandler,

    // ========== Query Handlers ==========
    pub download_status_handler: DownloadStatusHandler,
    pub get_download_audio_handler: GetDownloadAudioHandler,
    pub volume_info_handler: VolumeInfoHandler,
}

impl AppState {
    pub fn new(
        assembler: PlaylistAssembler,
        catalog: Arc<VoiceCatalog>,
        task_manager: Arc<dyn TaskManagerPort>,
        audio_cache: Arc<dyn AudioCachePort>,
        settings: DownloadSettings,
    ) -> Self {
        Self {
            catalog: catalog.clone(),

            build_download_handler: BuildDownloadHandler::new(
                assembler,
                catalog,
                task_manager.clone(),
                settings,
            ),
            clear_volume_handler: ClearVolumeHandler::new(audio_cache.clone()),

            download_status_handler: DownloadStatusHandler::new(task_manager.clone()),
            get_download_audio_handler: GetDownloadAudioHandler::new(
                audio_cache.clone(),
                task_manager,
            ),
            volume_info_handler: VolumeInfoHandler::new(audio_cache),
        }
    }
}
