//! Cache Commands - 缓存维护命令

/// 删除整个 volume
#[derive(Debug, Clone)]
pub struct ClearVolumeCommand {
    pub volume: String,
}

#[derive(Debug, Clone)]
pub struct ClearVolumeResponse {
    pub volume: String,
    /// 删除的文件数
    pub deleted: usize,
}
