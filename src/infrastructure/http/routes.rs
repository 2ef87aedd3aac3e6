//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                       GET   健康检查
//! - /api/download/build             POST  启动下载构建（后台执行）
//! - /api/download/status/{task_id}  GET   查询构建进度与结果
//! - /api/download/audio/{task_id}   GET   下载构建好的音频
//! - /api/cache/volumes              GET   各 volume 占用与命中统计
//! - /api/cache/clear                POST  删除 volume
//! - /api/voice/list                 GET   列出音色

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new().nest("/api", api_routes())
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/download", download_routes())
        .nest("/cache", cache_routes())
        .route("/voice/list", get(handlers::list_voices))
}

/// Download 路由
fn download_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/build", post(handlers::build_download))
        .route("/status/:task_id", get(handlers::download_status))
        .route("/audio/:task_id", get(handlers::download_audio))
}

/// Cache 路由
fn cache_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/volumes", get(handlers::list_volumes))
        .route("/clear", post(handlers::clear_volume))
}
