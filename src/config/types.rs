//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::domain::voice::AudioFormat;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 机器合成服务配置
    #[serde(default)]
    pub tts: TtsConfig,

    /// 真人录音归档配置
    #[serde(default)]
    pub archive: ArchiveConfig,

    /// 音频缓存配置
    #[serde(default)]
    pub cache: CacheConfig,

    /// 播放列表构建配置
    #[serde(default)]
    pub playlist: PlaylistConfig,

    /// 音频配置
    #[serde(default)]
    pub audio: AudioConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5060
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 机器合成服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct TtsConfig {
    /// 合成服务基础 URL
    #[serde(default = "default_tts_url")]
    pub url: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_tts_timeout")]
    pub timeout_secs: u64,

    /// 瞬时错误的最大重试次数
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// 首次重试前的等待（毫秒），之后逐次翻倍
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

fn default_tts_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_tts_timeout() -> u64 {
    60
}

fn default_max_retries() -> u32 {
    2
}

fn default_backoff_ms() -> u64 {
    500
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            url: default_tts_url(),
            timeout_secs: default_tts_timeout(),
            max_retries: default_max_retries(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

/// 真人录音归档配置
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveConfig {
    /// 录音归档基础 URL
    #[serde(default = "default_archive_url")]
    pub url: String,

    #[serde(default = "default_archive_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

fn default_archive_url() -> String {
    "http://localhost:8001/recordings".to_string()
}

fn default_archive_timeout() -> u64 {
    30
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            url: default_archive_url(),
            timeout_secs: default_archive_timeout(),
            max_retries: default_max_retries(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

/// 音频缓存配置
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// 缓存根目录
    #[serde(default = "default_cache_root")]
    pub root: PathBuf,

    /// 临时条目的保留时间（秒）
    #[serde(default = "default_ephemeral_age")]
    pub ephemeral_age_secs: u64,

    /// 后台清理间隔（秒）
    #[serde(default = "default_ephemeral_interval")]
    pub ephemeral_interval_secs: u64,

    /// 是否启动后台清理
    #[serde(default = "default_sweep_enabled")]
    pub sweep_enabled: bool,
}

fn default_cache_root() -> PathBuf {
    PathBuf::from("local/sounds")
}

fn default_ephemeral_age() -> u64 {
    900 // 15 分钟
}

fn default_ephemeral_interval() -> u64 {
    60
}

fn default_sweep_enabled() -> bool {
    true
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            root: default_cache_root(),
            ephemeral_age_secs: default_ephemeral_age(),
            ephemeral_interval_secs: default_ephemeral_interval(),
            sweep_enabled: default_sweep_enabled(),
        }
    }
}

/// 播放列表构建配置
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistConfig {
    /// 默认朗读顺序
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,

    /// 语言 → 默认音色名
    #[serde(default = "default_voices")]
    pub voices: BTreeMap<String, String>,

    /// 单次构建的时长上限（秒），0 表示不限
    #[serde(default)]
    pub max_seconds: u64,

    /// 同时合成的段数
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// 轨道之间的停顿（秒）
    #[serde(default = "default_break_seconds")]
    pub break_seconds: f32,

    /// 输出所在 volume
    #[serde(default = "default_playlist_volume")]
    pub volume: String,
}

fn default_languages() -> Vec<String> {
    vec!["pli".to_string(), "en".to_string()]
}

fn default_voices() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("pli".to_string(), "Aditi".to_string()),
        ("en".to_string(), "Amy".to_string()),
    ])
}

fn default_max_concurrent() -> usize {
    4
}

fn default_break_seconds() -> f32 {
    1.5
}

fn default_playlist_volume() -> String {
    "playlist".to_string()
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        Self {
            languages: default_languages(),
            voices: default_voices(),
            max_seconds: 0,
            max_concurrent: default_max_concurrent(),
            break_seconds: default_break_seconds(),
            volume: default_playlist_volume(),
        }
    }
}

/// 音频配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AudioConfig {
    /// 输出格式
    /// 可选: mp3, ogg, opus, wav
    #[serde(default)]
    pub format: AudioFormat,
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
