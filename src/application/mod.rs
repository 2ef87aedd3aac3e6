//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（AudioCache、SpeechSynthesizer、RecordedAudio、TaskManager 等）
//! - synthesis: 机器/真人合成后端
//! - playlist: 播放列表组装
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod playlist;
pub mod ports;
pub mod queries;
pub mod synthesis;

// Re-exports
pub use commands::{
    handlers::{BuildDownloadHandler, ClearVolumeHandler, DownloadSettings},
    BuildDownloadCommand, BuildDownloadResponse, ClearVolumeCommand, ClearVolumeResponse,
};

pub use error::ApplicationError;

pub use playlist::{AssembleRequest, AssembledAudio, PlaylistAssembler};

pub use ports::{
    AudioCachePort, AudioConcatenatorPort, CacheError, DownloadMetadata, RecordedAudioPort,
    SpeechSynthesizerPort, TaskManagerPort,
};

pub use queries::{
    handlers::{DownloadStatusHandler, GetDownloadAudioHandler, VolumeInfoHandler},
    DownloadStatusQuery, DownloadStatusResponse, GetDownloadAudioQuery, GetDownloadAudioResponse,
    VolumeInfoQuery, VolumeInfoResponse,
};

pub use synthesis::{RetryPolicy, SynthesisBackendFactory, SynthesisError};
