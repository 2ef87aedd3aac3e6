//! TTS Engine Port - 机器语音合成服务抽象
//!
//! 定义语音合成的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::voice::AudioFormat;

/// TTS 错误
#[derive(Debug, Error)]
pub enum TtsError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Voice not found: {0}")]
    VoiceNotFound(String),
}

impl TtsError {
    /// 是否值得重试
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            TtsError::NetworkError(_)
                | TtsError::Timeout
                | TtsError::RateLimited(_)
                | TtsError::ServiceError(_)
        )
    }
}

/// 合成请求
#[derive(Debug, Clone)]
pub struct SpeechRequest {
    /// 合成标记（SSML 片段）
    pub ssml: String,
    /// 合成服务中的音色名
    pub voice: String,
    /// BCP-47 locale
    pub language: String,
    pub format: AudioFormat,
}

/// Speech Synthesizer Port
///
/// 外部语音合成服务的抽象接口
#[async_trait]
pub trait SpeechSynthesizerPort: Send + Sync {
    /// 合成一段标记，返回音频数据
    async fn synthesize(&self, request: SpeechRequest) -> Result<Vec<u8>, TtsError>;
}
