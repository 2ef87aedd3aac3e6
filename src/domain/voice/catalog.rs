//! Voice Catalog
//!
//! 按名称查找音色配置

use std::collections::BTreeMap;

use super::{Prosody, Voice, VoiceError};
use crate::domain::phoneme::Lexicon;

/// 机器合成服务标识
pub const POLLY_API: &str = "aws-polly";

#[derive(Debug, Clone, Default)]
pub struct VoiceCatalog {
    voices: BTreeMap<String, Voice>,
}

impl VoiceCatalog {
    /// 内置音色
    pub fn builtin() -> Self {
        let amy = Voice::machine("Amy", "en-GB", POLLY_API)
            .with_prosody(Prosody::with_rate("-20%"))
            .with_locale_ipa("pli");
        let matthew = Voice::machine("Matthew", "en-US", POLLY_API)
            .with_prosody(Prosody::with_rate("-20%"))
            .with_locale_ipa("pli");
        let raveena = Voice::machine("Raveena", "en-IN", POLLY_API)
            .with_prosody(Prosody::with_rate("-20%"))
            .with_locale_ipa("pli")
            .with_lexicon(Lexicon::dialect("en-IN"));
        let aditi = Voice::machine("Aditi", "hi-IN", POLLY_API)
            .with_prosody(Prosody::with_rate("-30%"))
            .with_locale_ipa("pli")
            .with_strip_numbers(true)
            .with_strip_quotes(true);
        let vicki = Voice::machine("Vicki", "de-DE", POLLY_API)
            .with_prosody(Prosody::with_rate("-10%"))
            .with_locale_ipa("pli")
            .with_strip_quotes(true);
        let sujato_en = Voice::human("sujato_en", "en-AU", "sujato").with_fallback(amy.clone());
        let sujato_pli = Voice::human("sujato_pli", "pli", "sujato").with_fallback(aditi.clone());

        let mut catalog = Self::default();
        for voice in [amy, matthew, raveena, aditi, vicki, sujato_en, sujato_pli] {
            catalog.voices.insert(voice.name().to_lowercase(), voice);
        }
        catalog
    }

    /// 注册音色，同名覆盖
    pub fn insert(&mut self, voice: Voice) -> Result<(), VoiceError> {
        voice.validate()?;
        self.voices.insert(voice.name().to_lowercase(), voice);
        Ok(())
    }

    /// 按名称查找（忽略大小写）
    pub fn voice_of_name(&self, name: &str) -> Result<&Voice, VoiceError> {
        self.voices
            .get(&name.to_lowercase())
            .ok_or_else(|| VoiceError::UnknownVoice(name.to_string()))
    }

    /// 能朗读指定语言的音色
    pub fn voices_for_language<'a>(&'a self, language: &'a str) -> impl Iterator<Item = &'a Voice> {
        self.voices.values().filter(move |voice| voice.language() == language)
    }

    pub fn voices(&self) -> impl Iterator<Item = &Voice> {
        self.voices.values()
    }

    pub fn names(&self) -> Vec<&str> {
        self.voices.values().map(Voice::name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::voice::VoiceBackend;

    #[test]
    fn test_builtin_voices() {
        let catalog = VoiceCatalog::builtin();
        let amy = catalog.voice_of_name("amy").unwrap();
        assert_eq!(amy.name(), "Amy");
        assert_eq!(amy.locale(), "en-GB");
        assert_eq!(amy.prosody().rate.as_deref(), Some("-20%"));

        let aditi = catalog.voice_of_name("Aditi").unwrap();
        assert!(aditi.strip_numbers());
        assert!(aditi.strip_quotes());
        assert_eq!(aditi.locale_ipa(), Some("pli"));

        let raveena = catalog.voice_of_name("Raveena").unwrap();
        assert_eq!(raveena.ipa().get("sati"), Some("sɐθɪ"));
    }

    #[test]
    fn test_human_voices_have_machine_fallback() {
        let catalog = VoiceCatalog::builtin();
        let sujato = catalog.voice_of_name("sujato_pli").unwrap();
        assert!(matches!(sujato.backend(), VoiceBackend::Human { reader } if reader == "sujato"));
        assert_eq!(sujato.language(), "pli");
        assert_eq!(sujato.fallback().map(Voice::name), Some("Aditi"));
    }

    #[test]
    fn test_unknown_voice() {
        let catalog = VoiceCatalog::builtin();
        assert!(matches!(
            catalog.voice_of_name("nobody"),
            Err(VoiceError::UnknownVoice(_))
        ));
    }

    #[test]
    fn test_voices_for_language() {
        let catalog = VoiceCatalog::builtin();
        let english: Vec<_> = catalog.voices_for_language("en").map(Voice::name).collect();
        assert!(english.contains(&"Amy"));
        assert!(english.contains(&"sujato_en"));
        assert!(!english.contains(&"Vicki"));
    }
}
