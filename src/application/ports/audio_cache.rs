//! Audio Cache Port - 内容寻址音频缓存
//!
//! 定义音频缓存的抽象接口，具体实现使用本地文件系统
//!
//! 布局: `<root>/<volume>/<guid[0..2]>/<guid><suffix>`

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::SystemTime;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 默认 volume
pub const COMMON_VOLUME: &str = "common";

/// Audio Cache 错误
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("no volume: {0}")]
    NoVolume(String),

    #[error("Invalid guid: {0}")]
    InvalidGuid(String),

    #[error("IO error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for CacheError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

/// 单个 volume 的占用
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeInfo {
    pub name: String,
    /// 字节数
    pub size: u64,
}

/// 一次临时条目清理的结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EphemeralSweep {
    pub deleted: usize,
    pub remaining: usize,
}

/// 缓存统计信息
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub hit_count: u64,
    pub miss_count: u64,
    pub ephemeral_count: usize,
}

/// Audio Cache Port
///
/// - 缓存 key: guid（签名摘要）
/// - volume 为 None 时使用 COMMON_VOLUME
/// - 同一 guid 的并发写入是幂等的
#[async_trait]
pub trait AudioCachePort: Send + Sync {
    /// guid 对应的文件路径，按需创建目录
    async fn guid_path(
        &self,
        guid: &str,
        volume: Option<&str>,
        suffix: &str,
    ) -> Result<PathBuf, CacheError>;

    /// 原子写入音频数据
    async fn store(
        &self,
        guid: &str,
        volume: Option<&str>,
        suffix: &str,
        data: &[u8],
    ) -> Result<PathBuf, CacheError>;

    /// 读取音频数据，不存在返回 None
    async fn retrieve(
        &self,
        guid: &str,
        volume: Option<&str>,
        suffix: &str,
    ) -> Result<Option<Vec<u8>>, CacheError>;

    /// 写入签名旁注 (`<guid>.json`)
    async fn store_signature(
        &self,
        guid: &str,
        volume: Option<&str>,
        signature: &serde_json::Value,
    ) -> Result<(), CacheError>;

    /// 读取 guid 的签名；拼接签名展开为各文件签名
    async fn sound_info(
        &self,
        guid: &str,
        volume: Option<&str>,
    ) -> Result<Vec<serde_json::Value>, CacheError>;

    /// 标记为临时条目
    fn add_ephemeral(&self, guid: &str);

    /// 删除修改时间早于 older_than 的临时条目
    ///
    /// older_than 为 None 时使用配置的最大存活时间
    async fn clear_ephemerals(
        &self,
        older_than: Option<SystemTime>,
    ) -> Result<EphemeralSweep, CacheError>;

    /// 删除整个 volume，返回删除的文件数
    async fn clear_volume(&self, volume: &str) -> Result<usize, CacheError>;

    /// 各 volume 占用
    async fn volume_info(&self) -> Result<BTreeMap<String, VolumeInfo>, CacheError>;

    fn stats(&self) -> CacheStats;
}

/// 文档对应的 volume 名
///
/// `{collection}_{language}_{author}_{voice}`：collection 取文档 id 开头的字母部分，
/// thig/thag 归入 kn；巴利语原文的 author 固定为 mahasangiti
pub fn volume_name(document_id: &str, language: &str, author: &str, voice: &str) -> String {
    let prefix: String = document_id
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_lowercase();
    let collection = match prefix.as_str() {
        "thig" | "thag" => "kn",
        other => other,
    };
    let author = if language == "pli" { "mahasangiti" } else { author };
    format!("{collection}_{language}_{author}_{}", voice.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_name() {
        assert_eq!(volume_name("a", "b", "c", "d"), "a_b_c_d");
        assert_eq!(volume_name("a1", "b", "c", "d"), "a_b_c_d");
        assert_eq!(volume_name("a1.1", "b", "c", "d"), "a_b_c_d");
        assert_eq!(volume_name("a1.2-5", "b", "c", "d"), "a_b_c_d");
        assert_eq!(volume_name("a1.2-5:3.1", "b", "c", "d"), "a_b_c_d");
        assert_eq!(volume_name("thig1.2", "b", "c", "d"), "kn_b_c_d");
        assert_eq!(volume_name("thag1.2", "b", "c", "d"), "kn_b_c_d");
        assert_eq!(volume_name("thag1.2", "pli", "c", "d"), "kn_pli_mahasangiti_d");
        assert_eq!(volume_name("mn1", "pli", "c", "d"), "mn_pli_mahasangiti_d");
        assert_eq!(volume_name("an1.1", "en", "sujato", "Matthew"), "an_en_sujato_matthew");
    }
}
