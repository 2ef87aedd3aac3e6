//! Machine Voice Backend - 远端语音合成
//!
//! 文本先改写为 SSML 片段，每个片段独立签名并缓存于 common volume；
//! 多个片段的结果再以拼接签名缓存

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::backend::{cached_audio, store_audio};
use super::{RetryPolicy, SegmentRequest, SynthesisBackend, SynthesisError, SynthesisResult};
use crate::application::ports::{
    AudioCachePort, AudioConcatenatorPort, SpeechRequest, SpeechSynthesizerPort, TtsError,
};
use crate::domain::phoneme::segment_ssml;
use crate::domain::voice::{AudioFormat, Prosody, Voice, VoiceBackend};
use crate::domain::Signature;

/// 签名格式版本，改变签名字段时递增
pub const API_VERSION: &str = "v4";

/// 拼接结果的签名 api
pub const CONCAT_API: &str = "concat";

pub struct MachineVoiceBackend {
    voice: Voice,
    api: String,
    format: AudioFormat,
    synthesizer: Arc<dyn SpeechSynthesizerPort>,
    cache: Arc<dyn AudioCachePort>,
    concat: Arc<dyn AudioConcatenatorPort>,
    retry: RetryPolicy,
}

impl MachineVoiceBackend {
    pub fn new(
        voice: Voice,
        format: AudioFormat,
        synthesizer: Arc<dyn SpeechSynthesizerPort>,
        cache: Arc<dyn AudioCachePort>,
        concat: Arc<dyn AudioConcatenatorPort>,
    ) -> Result<Self, SynthesisError> {
        let api = match voice.backend() {
            VoiceBackend::Machine { api } => api.clone(),
            VoiceBackend::Human { .. } => {
                return Err(SynthesisError::InvalidInput(format!(
                    "{} is not a machine voice",
                    voice.name()
                )))
            }
        };
        Ok(Self {
            voice,
            api,
            format,
            synthesizer,
            cache,
            concat,
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// 单个片段的签名
    pub fn signature(&self, ssml: &str) -> Result<Signature, SynthesisError> {
        let mut fields = Map::new();
        fields.insert("api".into(), Value::from(self.api.as_str()));
        fields.insert("apiVersion".into(), Value::from(API_VERSION));
        fields.insert(
            "audioFormat".into(),
            Value::from(self.format.provider_format()),
        );
        fields.insert("voice".into(), Value::from(self.voice.name()));
        fields.insert("language".into(), Value::from(self.voice.locale()));
        fields.insert("prosody".into(), prosody_value(self.voice.prosody()));
        fields.insert("text".into(), Value::from(ssml));
        Ok(Signature::seal(fields)?)
    }

    fn concat_signature(&self, parts: &[Signature]) -> Result<Signature, SynthesisError> {
        let mut fields = Map::new();
        fields.insert("api".into(), Value::from(CONCAT_API));
        fields.insert(
            "audioFormat".into(),
            Value::from(self.format.provider_format()),
        );
        fields.insert(
            "files".into(),
            Value::Array(parts.iter().map(|s| Value::from(s.guid())).collect()),
        );
        Ok(Signature::seal(fields)?)
    }

    /// 发给合成服务的完整标记
    fn speak_markup(&self, ssml: &str) -> String {
        let prosody = self.voice.prosody();
        if prosody.is_empty() {
            return format!("<speak>{ssml}</speak>");
        }
        let mut attrs = String::new();
        if let Some(rate) = &prosody.rate {
            attrs.push_str(&format!(r#" rate="{rate}""#));
        }
        if let Some(pitch) = &prosody.pitch {
            attrs.push_str(&format!(r#" pitch="{pitch}""#));
        }
        format!("<speak><prosody{attrs}>{ssml}</prosody></speak>")
    }

    /// 缓存检查，未命中时调用合成服务并写缓存
    async fn synthesize_fragment(
        &self,
        signature: Signature,
    ) -> Result<SynthesisResult, SynthesisError> {
        let suffix = self.format.suffix();
        let guid = signature.guid().to_string();

        if let Some(audio) = cached_audio(self.cache.as_ref(), &guid, None, &suffix).await {
            return Ok(SynthesisResult {
                audio,
                signature,
                cached: true,
                hits: 1,
                misses: 0,
            });
        }

        let request = SpeechRequest {
            ssml: self.speak_markup(signature.text().unwrap_or_default()),
            voice: self.voice.name().to_string(),
            language: self.voice.locale().to_string(),
            format: self.format,
        };
        let synthesizer = self.synthesizer.as_ref();
        let request = &request;
        let audio = self
            .retry
            .run("tts.synthesize", TtsError::is_transient, move || {
                synthesizer.synthesize(request.clone())
            })
            .await
            .map_err(|e| {
                tracing::error!(guid = %guid, voice = %self.voice.name(), error = %e, "Speech synthesis failed");
                SynthesisError::from(e)
            })?;

        store_audio(self.cache.as_ref(), &signature, None, &suffix, &audio).await?;
        tracing::info!(
            guid = %guid,
            voice = %self.voice.name(),
            size = audio.len(),
            "Speech synthesized"
        );

        Ok(SynthesisResult {
            audio,
            signature,
            cached: false,
            hits: 0,
            misses: 1,
        })
    }
}

fn prosody_value(prosody: &Prosody) -> Value {
    let mut map = Map::new();
    if let Some(rate) = &prosody.rate {
        map.insert("rate".into(), Value::from(rate.as_str()));
    }
    if let Some(pitch) = &prosody.pitch {
        map.insert("pitch".into(), Value::from(pitch.as_str()));
    }
    Value::Object(map)
}

#[async_trait]
impl SynthesisBackend for MachineVoiceBackend {
    fn voice(&self) -> &Voice {
        &self.voice
    }

    async fn synthesize(&self, request: &SegmentRequest) -> Result<SynthesisResult, SynthesisError> {
        let fragments: Vec<String> = segment_ssml(&request.text, &self.voice).collect();
        if fragments.is_empty() {
            return Err(SynthesisError::InvalidInput(format!(
                "no speakable text for {}",
                self.voice.name()
            )));
        }

        let mut signatures = fragments
            .iter()
            .map(|ssml| self.signature(ssml))
            .collect::<Result<Vec<_>, _>>()?;

        if signatures.len() == 1 {
            if let Some(signature) = signatures.pop() {
                return self.synthesize_fragment(signature).await;
            }
        }

        let signature = self.concat_signature(&signatures)?;
        let suffix = self.format.suffix();
        if let Some(audio) = cached_audio(self.cache.as_ref(), signature.guid(), None, &suffix).await {
            return Ok(SynthesisResult {
                audio,
                signature,
                cached: true,
                hits: 1,
                misses: 0,
            });
        }

        let mut parts = Vec::with_capacity(signatures.len());
        let (mut hits, mut misses) = (0, 0);
        for fragment in signatures {
            let part = self.synthesize_fragment(fragment).await?;
            hits += part.hits;
            misses += part.misses;
            parts.push(part.audio);
        }

        let clips: Vec<&[u8]> = parts.iter().map(Vec::as_slice).collect();
        let audio = self.concat.concat(self.format, &clips)?;
        store_audio(self.cache.as_ref(), &signature, None, &suffix, &audio).await?;

        tracing::debug!(
            guid = %signature.guid(),
            fragments = clips.len(),
            "Fragments concatenated"
        );

        Ok(SynthesisResult {
            audio,
            signature,
            cached: false,
            hits,
            misses,
        })
    }

    async fn synthesize_break(&self, seconds: f32) -> Result<SynthesisResult, SynthesisError> {
        if !(seconds.is_finite() && seconds > 0.0) {
            return Err(SynthesisError::InvalidInput(format!(
                "invalid break duration: {seconds}"
            )));
        }
        let signature = self.signature(&format!(r#"<break time="{seconds}s"/>"#))?;
        self.synthesize_fragment(signature).await
    }
}
