//! Persistence Layer - 数据持久化
//!
//! 内容寻址的文件系统音频缓存

pub mod fs;

pub use self::fs::{EphemeralSweeper, FileAudioCache, FileCacheConfig};
