//! Cache Queries - 缓存占用查询

use crate::application::ports::{CacheStats, VolumeInfo};

#[derive(Debug, Clone, Default)]
pub struct VolumeInfoQuery;

#[derive(Debug, Clone)]
pub struct VolumeInfoResponse {
    pub volumes: Vec<VolumeInfo>,
    pub stats: CacheStats,
}
