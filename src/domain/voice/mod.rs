//! Voice Context - 音色限界上下文
//!
//! 职责:
//! - 音色配置（后端、locale、词典、韵律）
//! - 音频格式
//! - 音色目录

mod aggregate;
mod catalog;
mod errors;
mod value_objects;

pub use aggregate::{Voice, DEFAULT_MAX_SEGMENT};
pub use catalog::{VoiceCatalog, POLLY_API};
pub use errors::VoiceError;
pub use value_objects::{AudioFormat, Prosody, VoiceBackend};
