//! Fake TTS Client - 用于测试的合成客户端
//!
//! 不调用外部服务，按请求内容生成确定的字节并记录调用次数

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::application::ports::{SpeechRequest, SpeechSynthesizerPort, TtsError};
use crate::domain::hash_str;
use crate::domain::voice::AudioFormat;
use crate::infrastructure::adapters::concat::{encode_wav, WavFormat};

/// Fake TTS Client
///
/// 输出为请求的 md5 摘要字节；WAV 格式时包装成合法的 WAV 文件
#[derive(Default)]
pub struct FakeTtsClient {
    calls: AtomicUsize,
    /// 依次消费的预置错误
    failures: Mutex<VecDeque<TtsError>>,
    requests: Mutex<Vec<SpeechRequest>>,
}

impl FakeTtsClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// 接下来的调用依次返回这些错误
    pub fn with_failures(failures: impl IntoIterator<Item = TtsError>) -> Self {
        Self {
            failures: Mutex::new(failures.into_iter().collect()),
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<SpeechRequest> {
        self.requests.lock().clone()
    }

    /// 请求对应的确定输出
    pub fn audio_for(request: &SpeechRequest) -> Vec<u8> {
        let digest = hash_str(&format!(
            "{}|{}|{}",
            request.voice, request.language, request.ssml
        ));
        match request.format {
            AudioFormat::Wav => encode_wav(WavFormat::pcm_mono(16000), digest.as_bytes()),
            _ => digest.into_bytes(),
        }
    }
}

#[async_trait]
impl SpeechSynthesizerPort for FakeTtsClient {
    async fn synthesize(&self, request: SpeechRequest) -> Result<Vec<u8>, TtsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());

        if let Some(err) = self.failures.lock().pop_front() {
            tracing::debug!(error = %err, "FakeTtsClient: scripted failure");
            return Err(err);
        }

        tracing::debug!(
            voice = %request.voice,
            ssml_len = request.ssml.len(),
            "FakeTtsClient: returning generated audio"
        );
        Ok(Self::audio_for(&request))
    }
}
