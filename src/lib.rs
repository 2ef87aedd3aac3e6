//! Recital - 多语言朗读音频构建
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - 内容哈希与合成签名
//! - Voice Context: 音色配置与目录
//! - Phoneme Context: 发音改写与分句
//! - Playlist Context: 轨道、播放列表与统计
//! - 进度任务
//!
//! 应用层 (application/):
//! - Ports: 端口定义（AudioCache, SpeechSynthesizer, RecordedAudio, AudioConcatenator, TaskManager）
//! - Synthesis: 机器/真人合成后端
//! - Playlist: 播放列表组装
//! - Commands / Queries: CQRS 处理器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API
//! - Memory: TaskManager 内存实现
//! - Persistence: 文件系统内容寻址缓存
//! - Adapters: TTS / 录音归档客户端, 音频拼接

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
