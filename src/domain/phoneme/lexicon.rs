//! 发音词典
//!
//! 词 → IPA 音标。查找时忽略大小写

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// 巴利语内置词典
const PALI_ENTRIES: &[(&str, &str)] = &[
    ("abhikkantaṃ", "ɐbʰɪkkɐntɐŋ"),
    ("ariyasaccan’ti", "ɐɺɪjɐsɐccɐn’tɪ"),
    ("bhadante", "bʰɐdɐnte"),
    ("bhagavā", "bʰɐgɐʋaː"),
    ("bhante", "bʰɐnte"),
    ("bhikkhave", "bʰɪkkʰɐʋe"),
    ("bhikkhu", "bʰɪkkʰu"),
    ("buddha", "bʊddʰɐ"),
    ("dhamma", "dʰɐmmɐ"),
    ("dukkhassa", "dʊkkʰɐssɐ"),
    ("ekaṃ", "ekɐŋ"),
    ("evaṃ", "eʋɐŋ"),
    ("hetu", "hetu"),
    ("kissa", "kɪssa"),
    ("mūlaṃ", "mʊːlɐṃ"),
    ("nandī", "nɐndiː"),
    ("samayaṃ", "sɐmɐjɐŋ"),
    ("saṅgha", "sɐŋgʰa"),
    ("sati", "sɐtɪ"),
    ("sāvatthiyaṃ", "saːʋɐttʰɪjɐŋ"),
    ("sutaṃ", "sʊtɐŋ"),
    ("taṃ", "tɐŋ"),
    ("tassa", "tɐssɐ"),
    ("ti", "tɪ"),
    ("ye", "je"),
];

/// 印度英语口音的巴利语发音（覆盖内置词典）
const EN_IN_ENTRIES: &[(&str, &str)] = &[
    ("ariyasaccan’ti", "ɐɺɪjɐsɐccɐn’θɪ"),
    ("hetu", "heθu"),
    ("sati", "sɐθɪ"),
    ("taṃ", "θɐŋ"),
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lexicon(BTreeMap<String, String>);

impl Lexicon {
    pub fn from_entries(entries: &[(&str, &str)]) -> Self {
        Self(
            entries
                .iter()
                .map(|(word, ipa)| (word.to_lowercase(), ipa.to_string()))
                .collect(),
        )
    }

    /// 语言的内置词典，未知语言返回 None
    pub fn builtin(language: &str) -> Option<&'static Lexicon> {
        static PALI: OnceLock<Lexicon> = OnceLock::new();
        match language {
            "pli" => Some(PALI.get_or_init(|| Lexicon::from_entries(PALI_ENTRIES))),
            _ => None,
        }
    }

    /// 口音词典，用于特定 locale 的音色
    pub fn dialect(locale: &str) -> Lexicon {
        match locale {
            "en-IN" => Lexicon::from_entries(EN_IN_ENTRIES),
            _ => Lexicon::default(),
        }
    }

    pub fn get(&self, word: &str) -> Option<&str> {
        self.0.get(&word.to_lowercase()).map(String::as_str)
    }

    pub fn insert(&mut self, word: &str, ipa: &str) {
        self.0.insert(word.to_lowercase(), ipa.to_string());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
