//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod audio_cache;
mod audio_concat;
mod recorded_audio;
mod task_manager;
mod tts_engine;

pub use audio_cache::{
    volume_name, AudioCachePort, CacheError, CacheStats, EphemeralSweep, VolumeInfo,
    COMMON_VOLUME,
};
pub use audio_concat::{AudioConcatenatorPort, ConcatError};
pub use recorded_audio::{ArchiveError, RecordedAudioPort, RecordedClipRequest};
pub use task_manager::{DownloadMetadata, TaskError, TaskManagerPort};
pub use tts_engine::{SpeechRequest, SpeechSynthesizerPort, TtsError};
