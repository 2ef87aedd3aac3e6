//! Command Handlers 实现
//!
//! 所有 CommandHandler 的具体实现

mod cache_handlers;
mod download_handlers;

pub use cache_handlers::*;
pub use download_handlers::*;
