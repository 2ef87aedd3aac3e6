//! Audio Concatenator Port - 音频拼接

use thiserror::Error;

use crate::domain::voice::AudioFormat;

#[derive(Debug, Error)]
pub enum ConcatError {
    #[error("Nothing to concatenate")]
    Empty,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Incompatible clips: {0}")]
    Incompatible(String),
}

/// 将若干同格式片段按顺序拼接为一个文件
pub trait AudioConcatenatorPort: Send + Sync {
    fn concat(&self, format: AudioFormat, clips: &[&[u8]]) -> Result<Vec<u8>, ConcatError>;
}
