//! Synthesis Backend - 合成后端抽象
//!
//! 两种实现共享"签名 → 查缓存 → 未命中时获取 → 写缓存"的流程，
//! 区别只在未命中时的获取方式：
//! - MachineVoiceBackend: 调用远端合成服务
//! - HumanVoiceBackend: 从归档获取录音，缺失时交给后备音色

use async_trait::async_trait;

use super::SynthesisError;
use crate::application::ports::{AudioCachePort, COMMON_VOLUME};
use crate::domain::voice::Voice;
use crate::domain::Signature;

/// 一个待合成的文本段
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentRequest {
    pub text: String,
    /// 文本语言（非 locale），如 "pli"
    pub language: String,
    pub document_id: Option<String>,
    pub segment_id: Option<String>,
}

impl SegmentRequest {
    pub fn text(text: impl Into<String>, language: &str) -> Self {
        Self {
            text: text.into(),
            language: language.to_string(),
            ..Default::default()
        }
    }

    pub fn with_ids(mut self, document_id: &str, segment_id: &str) -> Self {
        self.document_id = Some(document_id.to_string());
        self.segment_id = Some(segment_id.to_string());
        self
    }
}

/// 合成结果
#[derive(Debug, Clone)]
pub struct SynthesisResult {
    pub audio: Vec<u8>,
    pub signature: Signature,
    /// 最终结果直接来自缓存
    pub cached: bool,
    /// 本次调用中缓存命中/未命中的片段数
    pub hits: usize,
    pub misses: usize,
}

impl SynthesisResult {
    pub fn guid(&self) -> &str {
        self.signature.guid()
    }
}

/// Synthesis Backend
///
/// 相同签名无论是否命中缓存都返回相同字节
#[async_trait]
pub trait SynthesisBackend: Send + Sync {
    fn voice(&self) -> &Voice;

    async fn synthesize(&self, request: &SegmentRequest) -> Result<SynthesisResult, SynthesisError>;

    /// 合成指定时长的停顿
    async fn synthesize_break(&self, seconds: f32) -> Result<SynthesisResult, SynthesisError>;
}

/// 读取缓存，读取失败按未命中处理
pub(crate) async fn cached_audio(
    cache: &dyn AudioCachePort,
    guid: &str,
    volume: Option<&str>,
    suffix: &str,
) -> Option<Vec<u8>> {
    match cache.retrieve(guid, volume, suffix).await {
        Ok(Some(audio)) => {
            tracing::debug!(guid = %guid, volume = volume.unwrap_or(COMMON_VOLUME), "Cache hit");
            Some(audio)
        }
        Ok(None) => {
            tracing::debug!(guid = %guid, volume = volume.unwrap_or(COMMON_VOLUME), "Cache miss");
            None
        }
        Err(e) => {
            tracing::warn!(guid = %guid, error = %e, "Cache read failed, treating as miss");
            None
        }
    }
}

/// 写入音频及签名旁注，写入失败对当前构建是致命的
pub(crate) async fn store_audio(
    cache: &dyn AudioCachePort,
    signature: &Signature,
    volume: Option<&str>,
    suffix: &str,
    audio: &[u8],
) -> Result<(), SynthesisError> {
    let guid = signature.guid();
    if let Err(e) = cache.store(guid, volume, suffix, audio).await {
        tracing::error!(guid = %guid, error = %e, "Cache write failed");
        return Err(e.into());
    }
    cache
        .store_signature(guid, volume, signature.as_value())
        .await?;
    Ok(())
}
