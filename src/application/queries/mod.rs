//! 应用层 - 查询（读操作）
//!
//! CQRS 查询侧：处理所有读操作

mod cache_queries;
mod download_queries;

pub mod handlers;

pub use cache_queries::*;
pub use download_queries::*;
