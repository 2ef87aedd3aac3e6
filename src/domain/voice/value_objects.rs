//! Voice Context - Value Objects

use serde::{Deserialize, Serialize};

use super::VoiceError;

/// 音频输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    #[default]
    Mp3,
    Ogg,
    Opus,
    Wav,
}

impl AudioFormat {
    /// 文件扩展名（不含点）
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Ogg => "ogg",
            Self::Opus => "opus",
            Self::Wav => "wav",
        }
    }

    /// 缓存文件后缀，如 ".mp3"
    pub fn suffix(&self) -> String {
        format!(".{}", self.extension())
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mp3",
            Self::Ogg => "audio/ogg",
            Self::Opus => "audio/opus",
            Self::Wav => "audio/wav",
        }
    }

    /// 合成服务使用的格式名，同时写入签名
    pub fn provider_format(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Ogg => "ogg_vorbis",
            Self::Opus => "ogg_opus",
            Self::Wav => "pcm_wav",
        }
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl std::str::FromStr for AudioFormat {
    type Err = VoiceError;

    /// 接受 "mp3"、".MP3" 等写法
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_lowercase().as_str() {
            "mp3" => Ok(Self::Mp3),
            "ogg" => Ok(Self::Ogg),
            "opus" => Ok(Self::Opus),
            "wav" => Ok(Self::Wav),
            _ => Err(VoiceError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// 韵律参数
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prosody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch: Option<String>,
}

impl Prosody {
    pub fn with_rate(rate: impl Into<String>) -> Self {
        Self {
            rate: Some(rate.into()),
            pitch: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rate.is_none() && self.pitch.is_none()
    }
}

/// 音色后端
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VoiceBackend {
    /// 机器合成，api 为合成服务标识（写入签名）
    Machine { api: String },
    /// 真人录音，reader 为朗读者标识
    Human { reader: String },
}

impl VoiceBackend {
    pub fn machine(api: impl Into<String>) -> Self {
        Self::Machine { api: api.into() }
    }

    pub fn human(reader: impl Into<String>) -> Self {
        Self::Human {
            reader: reader.into(),
        }
    }

    pub fn is_human(&self) -> bool {
        matches!(self, Self::Human { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_format_parse() {
        assert_eq!("mp3".parse::<AudioFormat>().unwrap(), AudioFormat::Mp3);
        assert_eq!(".mp3".parse::<AudioFormat>().unwrap(), AudioFormat::Mp3);
        assert_eq!(".OGG".parse::<AudioFormat>().unwrap(), AudioFormat::Ogg);
        assert_eq!("opus".parse::<AudioFormat>().unwrap(), AudioFormat::Opus);
        assert!("bad".parse::<AudioFormat>().is_err());
    }

    #[test]
    fn test_audio_format_metadata() {
        assert_eq!(AudioFormat::Mp3.suffix(), ".mp3");
        assert_eq!(AudioFormat::Ogg.content_type(), "audio/ogg");
        assert_eq!(AudioFormat::Ogg.provider_format(), "ogg_vorbis");
        assert_eq!(AudioFormat::default(), AudioFormat::Mp3);
    }

    #[test]
    fn test_prosody_serialization_skips_empty() {
        let json = serde_json::to_value(Prosody::default()).unwrap();
        assert_eq!(json, serde_json::json!({}));
        let json = serde_json::to_value(Prosody::with_rate("-20%")).unwrap();
        assert_eq!(json, serde_json::json!({"rate": "-20%"}));
    }
}
