//! 合成错误

use thiserror::Error;

use crate::application::ports::{ArchiveError, CacheError, ConcatError, TtsError};
use crate::domain::HashError;

#[derive(Debug, Error)]
pub enum SynthesisError {
    /// 输入错误：无可朗读文本、未知音色、超出时长
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 真人录音不存在且没有后备音色
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// 重试耗尽后的临时性远端错误
    #[error("Remote provider failed after retries: {0}")]
    Transient(String),

    #[error("Remote provider rejected request: {0}")]
    Permanent(String),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Hash error: {0}")]
    Hash(#[from] HashError),

    #[error("Concatenation error: {0}")]
    Concat(#[from] ConcatError),
}

impl From<TtsError> for SynthesisError {
    fn from(err: TtsError) -> Self {
        if err.is_transient() {
            Self::Transient(err.to_string())
        } else {
            Self::Permanent(err.to_string())
        }
    }
}

impl From<ArchiveError> for SynthesisError {
    fn from(err: ArchiveError) -> Self {
        if err.is_transient() {
            Self::Transient(err.to_string())
        } else {
            Self::Permanent(err.to_string())
        }
    }
}
