//! Domain Layer - 领域层
//!
//! 包含以下限界上下文:
//! - Voice Context: 音色配置与目录
//! - Phoneme Context: 发音改写
//! - Playlist Context: 播放列表
//!
//! 以及共享的内容哈希、合成签名与进度任务

pub mod hashing;
pub mod phoneme;
pub mod playlist;
pub mod progress;
pub mod signature;
pub mod voice;

pub use hashing::{hash_cached, hash_serialize, hash_str, hash_value, HashError};
pub use progress::{ProgressTask, TaskSnapshot, TaskState};
pub use signature::Signature;
