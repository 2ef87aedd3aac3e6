//! Query Handlers 实现
//!
//! 所有 QueryHandler 的具体实现

mod audio_handlers;
mod cache_handlers;
mod download_handlers;

pub use audio_handlers::*;
pub use cache_handlers::*;
pub use download_handlers::*;
