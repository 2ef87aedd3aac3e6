//! Download Commands - 下载构建命令

use std::collections::BTreeMap;

use crate::domain::playlist::Track;
use crate::domain::voice::AudioFormat;
use crate::domain::TaskSnapshot;

/// 启动一次异步下载构建
#[derive(Debug, Clone, Default)]
pub struct BuildDownloadCommand {
    /// 文件名前缀，通常为查询的文档范围
    pub label: String,
    pub tracks: Vec<Track>,
    /// 朗读顺序，缺省使用配置
    pub languages: Option<Vec<String>>,
    /// 语言 → 音色名，未给出的语言使用配置的默认音色
    pub voices: BTreeMap<String, String>,
    pub format: Option<AudioFormat>,
    pub max_seconds: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct BuildDownloadResponse {
    pub task_id: String,
    pub task: TaskSnapshot,
}
