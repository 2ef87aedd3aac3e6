//! HTTP Handlers

mod cache;
mod download;
mod ping;
mod voice;

pub use cache::*;
pub use download::*;
pub use ping::*;
pub use voice::*;
