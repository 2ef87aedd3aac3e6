//! Synthesis Backend Factory
//!
//! 按音色配置装配合成后端，后备音色递归装配

use std::sync::Arc;

use super::{HumanVoiceBackend, MachineVoiceBackend, RetryPolicy, SynthesisBackend, SynthesisError};
use crate::application::ports::{
    AudioCachePort, AudioConcatenatorPort, RecordedAudioPort, SpeechSynthesizerPort,
};
use crate::domain::voice::{AudioFormat, Voice, VoiceBackend};

#[derive(Clone)]
pub struct SynthesisBackendFactory {
    synthesizer: Arc<dyn SpeechSynthesizerPort>,
    archive: Arc<dyn RecordedAudioPort>,
    cache: Arc<dyn AudioCachePort>,
    concat: Arc<dyn AudioConcatenatorPort>,
    tts_retry: RetryPolicy,
    archive_retry: RetryPolicy,
}

impl SynthesisBackendFactory {
    pub fn new(
        synthesizer: Arc<dyn SpeechSynthesizerPort>,
        archive: Arc<dyn RecordedAudioPort>,
        cache: Arc<dyn AudioCachePort>,
        concat: Arc<dyn AudioConcatenatorPort>,
    ) -> Self {
        Self {
            synthesizer,
            archive,
            cache,
            concat,
            tts_retry: RetryPolicy::default(),
            archive_retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, tts_retry: RetryPolicy, archive_retry: RetryPolicy) -> Self {
        self.tts_retry = tts_retry;
        self.archive_retry = archive_retry;
        self
    }

    pub fn cache(&self) -> &Arc<dyn AudioCachePort> {
        &self.cache
    }

    pub fn concatenator(&self) -> &Arc<dyn AudioConcatenatorPort> {
        &self.concat
    }

    pub fn backend_for(
        &self,
        voice: &Voice,
        format: AudioFormat,
    ) -> Result<Arc<dyn SynthesisBackend>, SynthesisError> {
        voice
            .validate()
            .map_err(|e| SynthesisError::InvalidInput(e.to_string()))?;

        match voice.backend() {
            VoiceBackend::Machine { .. } => {
                let backend = MachineVoiceBackend::new(
                    voice.clone(),
                    format,
                    self.synthesizer.clone(),
                    self.cache.clone(),
                    self.concat.clone(),
                )?
                .with_retry(self.tts_retry);
                Ok(Arc::new(backend))
            }
            VoiceBackend::Human { .. } => {
                let mut backend = HumanVoiceBackend::new(
                    voice.clone(),
                    format,
                    self.archive.clone(),
                    self.cache.clone(),
                )?
                .with_retry(self.archive_retry);
                if let Some(fallback) = voice.fallback() {
                    backend = backend.with_fallback(self.backend_for(fallback, format)?);
                }
                Ok(Arc::new(backend))
            }
        }
    }
}
