//! 文件系统缓存实现

mod audio_cache;
mod sweeper;

pub use audio_cache::{FileAudioCache, FileCacheConfig};
pub use sweeper::EphemeralSweeper;
