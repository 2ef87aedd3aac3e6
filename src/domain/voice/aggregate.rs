//! Voice Context - Aggregate Root

use serde::{Deserialize, Serialize};

use super::{Prosody, VoiceBackend, VoiceError};
use crate::domain::phoneme::Lexicon;

/// 默认单次合成最大字符数
pub const DEFAULT_MAX_SEGMENT: usize = 1000;

/// Voice 聚合根
///
/// 不变量:
/// - name 非空
/// - max_segment > 0
/// - fallback 链不包含真人音色自身（由目录校验）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voice {
    name: String,
    /// BCP-47 语言标签，如 "en-GB"
    locale: String,
    backend: VoiceBackend,
    /// 音色专属发音词典，优先于 locale_ipa 词典
    #[serde(default)]
    ipa: Lexicon,
    /// 使用哪种语言的内置词典
    locale_ipa: Option<String>,
    #[serde(default)]
    prosody: Prosody,
    #[serde(default)]
    strip_numbers: bool,
    #[serde(default)]
    strip_quotes: bool,
    max_segment: usize,
    fallback: Option<Box<Voice>>,
}

impl Voice {
    /// 创建机器合成音色
    pub fn machine(name: &str, locale: &str, api: &str) -> Self {
        Self::new(name, locale, VoiceBackend::machine(api))
    }

    /// 创建真人录音音色
    pub fn human(name: &str, locale: &str, reader: &str) -> Self {
        Self::new(name, locale, VoiceBackend::human(reader))
    }

    fn new(name: &str, locale: &str, backend: VoiceBackend) -> Self {
        Self {
            name: name.to_string(),
            locale: locale.to_string(),
            backend,
            ipa: Lexicon::default(),
            locale_ipa: None,
            prosody: Prosody::default(),
            strip_numbers: false,
            strip_quotes: false,
            max_segment: DEFAULT_MAX_SEGMENT,
            fallback: None,
        }
    }

    pub fn with_prosody(mut self, prosody: Prosody) -> Self {
        self.prosody = prosody;
        self
    }

    pub fn with_locale_ipa(mut self, language: &str) -> Self {
        self.locale_ipa = Some(language.to_string());
        self
    }

    pub fn with_lexicon(mut self, ipa: Lexicon) -> Self {
        self.ipa = ipa;
        self
    }

    pub fn with_strip_numbers(mut self, strip: bool) -> Self {
        self.strip_numbers = strip;
        self
    }

    pub fn with_strip_quotes(mut self, strip: bool) -> Self {
        self.strip_quotes = strip;
        self
    }

    pub fn with_max_segment(mut self, max_segment: usize) -> Self {
        self.max_segment = max_segment;
        self
    }

    pub fn with_fallback(mut self, fallback: Voice) -> Self {
        self.fallback = Some(Box::new(fallback));
        self
    }

    /// 校验不变量
    pub fn validate(&self) -> Result<(), VoiceError> {
        if self.name.trim().is_empty() {
            return Err(VoiceError::InvalidProfile("voice name is empty".into()));
        }
        if self.max_segment == 0 {
            return Err(VoiceError::InvalidProfile(format!(
                "{}: max_segment must be positive",
                self.name
            )));
        }
        if let Some(fallback) = &self.fallback {
            if fallback.name == self.name {
                return Err(VoiceError::InvalidProfile(format!(
                    "{}: voice cannot fall back to itself",
                    self.name
                )));
            }
            fallback.validate()?;
        }
        Ok(())
    }

    /// locale 的语言部分，如 "en-GB" → "en"
    pub fn language(&self) -> &str {
        self.locale.split('-').next().unwrap_or(&self.locale)
    }

    // Getters
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn backend(&self) -> &VoiceBackend {
        &self.backend
    }

    pub fn ipa(&self) -> &Lexicon {
        &self.ipa
    }

    pub fn locale_ipa(&self) -> Option<&str> {
        self.locale_ipa.as_deref()
    }

    pub fn prosody(&self) -> &Prosody {
        &self.prosody
    }

    pub fn strip_numbers(&self) -> bool {
        self.strip_numbers
    }

    pub fn strip_quotes(&self) -> bool {
        self.strip_quotes
    }

    pub fn max_segment(&self) -> usize {
        self.max_segment
    }

    pub fn fallback(&self) -> Option<&Voice> {
        self.fallback.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_defaults() {
        let voice = Voice::machine("Amy", "en-GB", "aws-polly");
        assert_eq!(voice.name(), "Amy");
        assert_eq!(voice.language(), "en");
        assert_eq!(voice.max_segment(), DEFAULT_MAX_SEGMENT);
        assert!(!voice.strip_quotes());
        assert!(voice.fallback().is_none());
        assert!(voice.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_self_fallback() {
        let voice = Voice::human("sujato_en", "en-AU", "sujato")
            .with_fallback(Voice::human("sujato_en", "en-AU", "sujato"));
        assert!(matches!(voice.validate(), Err(VoiceError::InvalidProfile(_))));
    }

    #[test]
    fn test_validate_rejects_zero_max_segment() {
        let voice = Voice::machine("Amy", "en-GB", "aws-polly").with_max_segment(0);
        assert!(voice.validate().is_err());
    }
}
