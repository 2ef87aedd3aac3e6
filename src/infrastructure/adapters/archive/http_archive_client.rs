//! HTTP Archive Client - 获取真人录音
//!
//! 实现 RecordedAudioPort trait
//!
//! 归档布局:
//! GET {base_url}/{reader}/{document_id}/{segment_id}.{ext}
//! 各路径段分别做百分号编码，404 表示该段没有录音

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use std::time::Duration;

use crate::application::ports::{ArchiveError, RecordedAudioPort, RecordedClipRequest};

/// HTTP 归档客户端配置
#[derive(Debug, Clone)]
pub struct HttpArchiveClientConfig {
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpArchiveClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001/recordings".to_string(),
            timeout_secs: 30,
        }
    }
}

impl HttpArchiveClientConfig {
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

pub struct HttpArchiveClient {
    client: Client,
    base_url: Url,
}

impl HttpArchiveClient {
    pub fn new(config: HttpArchiveClientConfig) -> Result<Self, ArchiveError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ArchiveError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ArchiveError::InvalidUrl(config.base_url));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ArchiveError::NetworkError(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    /// 段号中的 ':' 保留，'/', '?', '#' 等被编码，不会改变路径结构
    fn clip_url(&self, request: &RecordedClipRequest) -> Result<Url, ArchiveError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ArchiveError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push(&request.reader)
            .push(&request.document_id)
            .push(&format!(
                "{}.{}",
                request.segment_id,
                request.format.extension()
            ));
        Ok(url)
    }
}

#[async_trait]
impl RecordedAudioPort for HttpArchiveClient {
    async fn fetch_recorded_clip(
        &self,
        request: &RecordedClipRequest,
    ) -> Result<Option<Vec<u8>>, ArchiveError> {
        let url = self.clip_url(request)?;
        tracing::debug!(url = %url, "Fetching recorded clip");

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                ArchiveError::Timeout
            } else if e.is_connect() {
                ArchiveError::NetworkError(format!("Cannot connect to archive: {}", e))
            } else {
                ArchiveError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status();
        match status {
            StatusCode::NOT_FOUND => {
                tracing::debug!(url = %url, "Recorded clip not found");
                return Ok(None);
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(ArchiveError::AccessDenied(format!("HTTP {}", status)));
            }
            s if !s.is_success() => {
                let error_text = response.text().await.unwrap_or_default();
                return Err(ArchiveError::ServiceError(format!(
                    "HTTP {}: {}",
                    s, error_text
                )));
            }
            _ => {}
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| ArchiveError::NetworkError(format!("Failed to read clip: {}", e)))?
            .to_vec();

        tracing::info!(
            reader = %request.reader,
            document_id = %request.document_id,
            segment_id = %request.segment_id,
            audio_size = audio.len(),
            "Recorded clip fetched"
        );

        Ok(Some(audio))
    }
}
