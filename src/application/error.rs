//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use thiserror::Error;

use crate::application::ports::{CacheError, TaskError};
use crate::application::synthesis::SynthesisError;
use crate::domain::voice::VoiceError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 状态无效
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// 真人录音缺失且无后备音色
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// 外部服务错误
    #[error("External service error: {0}")]
    ExternalServiceError(String),

    /// 存储错误
    #[error("Storage error: {0}")]
    StorageError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type,
            id: id.into(),
        }
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建状态无效错误
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<SynthesisError> for ApplicationError {
    fn from(err: SynthesisError) -> Self {
        match err {
            SynthesisError::InvalidInput(msg) => Self::ValidationError(msg),
            SynthesisError::Unavailable(msg) => Self::Unavailable(msg),
            SynthesisError::Transient(_) | SynthesisError::Permanent(_) => {
                Self::ExternalServiceError(err.to_string())
            }
            SynthesisError::Cache(e) => e.into(),
            SynthesisError::Hash(e) => Self::InternalError(e.to_string()),
            SynthesisError::Concat(e) => Self::InternalError(e.to_string()),
        }
    }
}

impl From<CacheError> for ApplicationError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::NoVolume(volume) => Self::not_found("Volume", volume),
            CacheError::InvalidGuid(guid) => Self::ValidationError(format!("invalid guid: {guid}")),
            CacheError::IoError(msg) => Self::StorageError(msg),
        }
    }
}

impl From<TaskError> for ApplicationError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::NotFound(id) => Self::not_found("Task", id),
            TaskError::AlreadyExists(_) => Self::InternalError(err.to_string()),
        }
    }
}

impl From<VoiceError> for ApplicationError {
    fn from(err: VoiceError) -> Self {
        Self::ValidationError(err.to_string())
    }
}
