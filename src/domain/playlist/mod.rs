//! Playlist Context - 播放列表
//!
//! 多语言、多文档的朗读顺序与时长估算

mod aggregate;
mod errors;
mod track;

pub use aggregate::{Playlist, PlaylistStats, DEFAULT_LANGUAGES};
pub use errors::PlaylistError;
pub use track::{Track, TrackSegment};
