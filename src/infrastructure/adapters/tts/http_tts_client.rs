//! HTTP TTS Client - 调用外部语音合成服务
//!
//! 实现 SpeechSynthesizerPort trait
//!
//! 外部合成 API:
//! POST {base_url}/api/tts/synthesize
//! Request: {"ssml": "<speak>...</speak>", "voice": "Amy", "language": "en-GB", "format": "mp3"}
//! Response: 音频二进制

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;

use crate::application::ports::{SpeechRequest, SpeechSynthesizerPort, TtsError};

/// 合成请求体 (JSON)
#[derive(Debug, Serialize)]
struct SynthesizeHttpRequest<'a> {
    ssml: &'a str,
    voice: &'a str,
    language: &'a str,
    /// 服务端格式名，如 "ogg_vorbis"
    format: &'a str,
}

/// HTTP TTS 客户端配置
#[derive(Debug, Clone)]
pub struct HttpTtsClientConfig {
    /// 合成服务基础 URL
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpTtsClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 60,
        }
    }
}

impl HttpTtsClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP TTS 客户端
pub struct HttpTtsClient {
    client: Client,
    config: HttpTtsClientConfig,
}

impl HttpTtsClient {
    pub fn new(config: HttpTtsClientConfig) -> Result<Self, TtsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TtsError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn synthesize_url(&self) -> String {
        format!(
            "{}/api/tts/synthesize",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

/// 按状态码划分错误类别：429 与 5xx 可重试
fn status_error(status: StatusCode, voice: &str, body: String) -> TtsError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => TtsError::RateLimited(body),
        StatusCode::NOT_FOUND => TtsError::VoiceNotFound(voice.to_string()),
        s if s.is_server_error() => TtsError::ServiceError(format!("HTTP {}: {}", s, body)),
        s => TtsError::InvalidRequest(format!("HTTP {}: {}", s, body)),
    }
}

fn request_error(e: reqwest::Error) -> TtsError {
    if e.is_timeout() {
        TtsError::Timeout
    } else if e.is_connect() {
        TtsError::NetworkError(format!("Cannot connect to TTS service: {}", e))
    } else {
        TtsError::NetworkError(e.to_string())
    }
}

#[async_trait]
impl SpeechSynthesizerPort for HttpTtsClient {
    async fn synthesize(&self, request: SpeechRequest) -> Result<Vec<u8>, TtsError> {
        let body = SynthesizeHttpRequest {
            ssml: &request.ssml,
            voice: &request.voice,
            language: &request.language,
            format: request.format.provider_format(),
        };

        tracing::debug!(
            url = %self.synthesize_url(),
            voice = %request.voice,
            ssml_len = request.ssml.len(),
            "Sending TTS synthesize request"
        );

        let response = self
            .client
            .post(self.synthesize_url())
            .json(&body)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(status_error(status, &request.voice, error_text));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| TtsError::InvalidResponse(format!("Failed to read audio: {}", e)))?
            .to_vec();

        if audio.is_empty() {
            return Err(TtsError::InvalidResponse("Empty audio body".to_string()));
        }

        tracing::info!(
            voice = %request.voice,
            language = %request.language,
            audio_size = audio.len(),
            "TTS synthesis completed"
        );

        Ok(audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = HttpTtsClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn test_config_builder() {
        let config = HttpTtsClientConfig::new("http://example.com:9000/").with_timeout(15);
        let client = HttpTtsClient::new(config).unwrap();
        assert_eq!(
            client.synthesize_url(),
            "http://example.com:9000/api/tts/synthesize"
        );
        assert_eq!(client.config.timeout_secs, 15);
    }

    #[test]
    fn test_status_classification() {
        let rate = status_error(StatusCode::TOO_MANY_REQUESTS, "Amy", String::new());
        assert!(matches!(rate, TtsError::RateLimited(_)));
        assert!(rate.is_transient());

        let server = status_error(StatusCode::BAD_GATEWAY, "Amy", String::new());
        assert!(server.is_transient());

        let missing = status_error(StatusCode::NOT_FOUND, "Nobody", String::new());
        assert!(matches!(missing, TtsError::VoiceNotFound(ref v) if v == "Nobody"));
        assert!(!missing.is_transient());

        let bad = status_error(StatusCode::BAD_REQUEST, "Amy", "bad ssml".into());
        assert!(matches!(bad, TtsError::InvalidRequest(_)));
        assert!(!bad.is_transient());
    }
}
