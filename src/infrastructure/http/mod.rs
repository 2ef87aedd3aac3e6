//! HTTP Layer - RESTful API
//!
//! 下载构建与缓存维护接口，响应统一为 {errno, error, data}

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use routes::create_routes;
pub use server::{HttpServer, ServerConfig};
pub use state::AppState;
