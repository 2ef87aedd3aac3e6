//! Playlist - 播放列表组装

mod assembler;

pub use assembler::{
    AssembleRequest, AssembledAudio, PlaylistAssembler, OVERHEAD_STEPS, PLAYLIST_API,
};
