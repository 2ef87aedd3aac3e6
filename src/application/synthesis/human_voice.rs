//! Human Voice Backend - 真人录音
//!
//! 录音按 (reader, document, segment) 从归档获取，缓存在文档对应的 volume；
//! 缺失时交给后备音色，没有后备音色时报告不可用

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::backend::{cached_audio, store_audio};
use super::{RetryPolicy, SegmentRequest, SynthesisBackend, SynthesisError, SynthesisResult};
use crate::application::ports::{
    volume_name, ArchiveError, AudioCachePort, RecordedAudioPort, RecordedClipRequest,
};
use crate::domain::voice::{AudioFormat, Voice, VoiceBackend};
use crate::domain::Signature;

/// 录音签名 api
pub const HUMAN_API: &str = "human-tts";

pub struct HumanVoiceBackend {
    voice: Voice,
    reader: String,
    format: AudioFormat,
    archive: Arc<dyn RecordedAudioPort>,
    cache: Arc<dyn AudioCachePort>,
    fallback: Option<Arc<dyn SynthesisBackend>>,
    retry: RetryPolicy,
}

impl HumanVoiceBackend {
    pub fn new(
        voice: Voice,
        format: AudioFormat,
        archive: Arc<dyn RecordedAudioPort>,
        cache: Arc<dyn AudioCachePort>,
    ) -> Result<Self, SynthesisError> {
        let reader = match voice.backend() {
            VoiceBackend::Human { reader } => reader.clone(),
            VoiceBackend::Machine { .. } => {
                return Err(SynthesisError::InvalidInput(format!(
                    "{} is not a human voice",
                    voice.name()
                )))
            }
        };
        Ok(Self {
            voice,
            reader,
            format,
            archive,
            cache,
            fallback: None,
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn SynthesisBackend>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn signature(
        &self,
        document_id: &str,
        segment_id: &str,
        language: &str,
    ) -> Result<Signature, SynthesisError> {
        let mut fields = Map::new();
        fields.insert("api".into(), Value::from(HUMAN_API));
        fields.insert("reader".into(), Value::from(self.reader.as_str()));
        fields.insert("documentId".into(), Value::from(document_id));
        fields.insert("segmentId".into(), Value::from(segment_id));
        fields.insert("language".into(), Value::from(language));
        fields.insert(
            "audioFormat".into(),
            Value::from(self.format.provider_format()),
        );
        Ok(Signature::seal(fields)?)
    }

    /// 录音缺失时的处理
    async fn fall_back(
        &self,
        request: &SegmentRequest,
        reason: String,
    ) -> Result<SynthesisResult, SynthesisError> {
        match &self.fallback {
            Some(fallback) => {
                tracing::info!(
                    voice = %self.voice.name(),
                    fallback = %fallback.voice().name(),
                    reason = %reason,
                    "Recording unavailable, using fallback voice"
                );
                fallback.synthesize(request).await
            }
            None => Err(SynthesisError::Unavailable(reason)),
        }
    }
}

#[async_trait]
impl SynthesisBackend for HumanVoiceBackend {
    fn voice(&self) -> &Voice {
        &self.voice
    }

    async fn synthesize(&self, request: &SegmentRequest) -> Result<SynthesisResult, SynthesisError> {
        let (Some(document_id), Some(segment_id)) =
            (request.document_id.as_deref(), request.segment_id.as_deref())
        else {
            let reason = format!("{} only reads document segments", self.voice.name());
            return self.fall_back(request, reason).await;
        };

        let signature = self.signature(document_id, segment_id, &request.language)?;
        let volume = volume_name(
            document_id,
            &request.language,
            &self.reader,
            self.voice.name(),
        );
        let suffix = self.format.suffix();

        if let Some(audio) =
            cached_audio(self.cache.as_ref(), signature.guid(), Some(&volume), &suffix).await
        {
            return Ok(SynthesisResult {
                audio,
                signature,
                cached: true,
                hits: 1,
                misses: 0,
            });
        }

        let clip = RecordedClipRequest {
            reader: self.reader.clone(),
            document_id: document_id.to_string(),
            segment_id: segment_id.to_string(),
            language: request.language.clone(),
            format: self.format,
        };
        let archive = self.archive.as_ref();
        let clip = &clip;
        let recording = self
            .retry
            .run("archive.fetch", ArchiveError::is_transient, move || {
                archive.fetch_recorded_clip(clip)
            })
            .await?;

        let Some(audio) = recording else {
            let reason = format!("no recording by {} for {}", self.reader, segment_id);
            return self.fall_back(request, reason).await;
        };

        store_audio(self.cache.as_ref(), &signature, Some(&volume), &suffix, &audio).await?;
        tracing::info!(
            guid = %signature.guid(),
            volume = %volume,
            segment_id = %segment_id,
            "Recording cached"
        );

        Ok(SynthesisResult {
            audio,
            signature,
            cached: false,
            hits: 0,
            misses: 1,
        })
    }

    async fn synthesize_break(&self, seconds: f32) -> Result<SynthesisResult, SynthesisError> {
        match &self.fallback {
            Some(fallback) => fallback.synthesize_break(seconds).await,
            None => Err(SynthesisError::Unavailable(format!(
                "{} cannot produce breaks",
                self.voice.name()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::synthesis::MachineVoiceBackend;
    use crate::domain::voice::VoiceCatalog;
    use crate::infrastructure::adapters::{FakeArchiveClient, FakeTtsClient, StreamConcatenator};
    use crate::infrastructure::persistence::{FileAudioCache, FileCacheConfig};
    use std::time::Duration;
    use tempfile::TempDir;

    async fn cache_in(dir: &TempDir) -> Arc<FileAudioCache> {
        FileAudioCache::new(FileCacheConfig {
            root: dir.path().to_path_buf(),
            ephemeral_age: Duration::from_secs(60),
        })
        .await
        .unwrap()
        .arc()
    }

    fn sujato(catalog: &VoiceCatalog) -> Voice {
        catalog.voice_of_name("sujato_en").unwrap().clone()
    }

    #[tokio::test]
    async fn test_recording_is_fetched_then_cached() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir).await;
        let archive =
            Arc::new(FakeArchiveClient::new().with_clip("sujato", "mn1", "mn1:1.1", b"recorded"));
        let backend = HumanVoiceBackend::new(
            sujato(&VoiceCatalog::builtin()),
            AudioFormat::Mp3,
            archive.clone(),
            cache.clone(),
        )
        .unwrap();

        let request = SegmentRequest::text("Bhikkhus", "en").with_ids("mn1", "mn1:1.1");
        let first = backend.synthesize(&request).await.unwrap();
        let second = backend.synthesize(&request).await.unwrap();

        assert_eq!(first.audio, b"recorded");
        assert!(second.cached);
        assert_eq!(archive.call_count(), 1);
        assert_eq!(first.signature.api(), Some(HUMAN_API));
        assert_eq!(first.signature.get_str("segmentId"), Some("mn1:1.1"));

        let path = cache
            .guid_path(first.guid(), Some("mn_en_sujato_sujato_en"), ".mp3")
            .await
            .unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_missing_recording_without_fallback_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir).await;
        let voice = Voice::human("reader_only", "en-AU", "sujato");
        let backend = HumanVoiceBackend::new(
            voice,
            AudioFormat::Mp3,
            Arc::new(FakeArchiveClient::new()),
            cache,
        )
        .unwrap();

        let request = SegmentRequest::text("Missing", "en").with_ids("mn1", "mn1:9.9");
        let result = backend.synthesize(&request).await;
        assert!(matches!(result, Err(SynthesisError::Unavailable(_))));
        assert!(matches!(
            backend.synthesize_break(1.0).await,
            Err(SynthesisError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_recording_uses_fallback() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir).await;
        let catalog = VoiceCatalog::builtin();
        let tts = Arc::new(FakeTtsClient::new());
        let amy = MachineVoiceBackend::new(
            catalog.voice_of_name("Amy").unwrap().clone(),
            AudioFormat::Mp3,
            tts.clone(),
            cache.clone(),
            Arc::new(StreamConcatenator::new()),
        )
        .unwrap();
        let backend = HumanVoiceBackend::new(
            sujato(&catalog),
            AudioFormat::Mp3,
            Arc::new(FakeArchiveClient::new()),
            cache,
        )
        .unwrap()
        .with_fallback(Arc::new(amy));

        let request = SegmentRequest::text("Missing", "en").with_ids("mn1", "mn1:9.9");
        let result = backend.synthesize(&request).await.unwrap();
        assert_eq!(result.signature.get_str("voice"), Some("Amy"));
        assert_eq!(tts.call_count(), 1);
    }
}
