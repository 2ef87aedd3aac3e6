//! Playlist Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlaylistError {
    #[error("Playlist has no speaking languages")]
    NoLanguages,

    #[error("Playlist duration of {duration} seconds exceeds the limit of {max_seconds} seconds")]
    DurationExceeded { duration: u64, max_seconds: u64 },
}
