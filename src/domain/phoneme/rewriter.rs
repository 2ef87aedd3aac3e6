//! Phoneme Rewriter
//!
//! 将原文改写为语音合成标记片段：
//! - 词典中的词替换为 IPA phoneme 标记，后接极短停顿
//! - 去除零宽字符，按音色设置去除引号或数字
//! - 按句切分，超出音色 max_segment 的句子按词再切分

use std::collections::VecDeque;

use super::sentences::{chunk_words, Sentences};
use super::Lexicon;
use crate::domain::voice::Voice;

/// 每个 phoneme 标记之后插入的停顿
pub const BREAK: &str = r#"<break time="0.001s"/>"#;

const ZERO_WIDTH: &[char] = &['\u{200B}', '\u{200C}', '\u{200D}', '\u{FEFF}'];

/// strip_quotes 时移除的引号（’ 作为省音符保留）
const QUOTES: &[char] = &['"', '\u{201C}', '\u{201D}', '\u{2018}', '\u{00AB}', '\u{00BB}'];

/// 数字中允许出现的标点
const NUMBER_PUNCTUATION: &[char] = &['.', ',', ':', '-', '\u{2013}', '\u{2014}'];

/// 生成 phoneme 标记片段
pub fn phoneme_markup(ipa: &str, word: &str) -> String {
    format!(r#"<phoneme alphabet="ipa" ph="{ipa}">{word}</phoneme>{BREAK}"#)
}

/// 改写单个词：先查音色词典，再查 locale 词典
pub fn word_ssml(word: &str, voice: &Voice) -> String {
    let ipa = voice.ipa().get(word).or_else(|| {
        voice
            .locale_ipa()
            .and_then(Lexicon::builtin)
            .and_then(|lexicon| lexicon.get(word))
    });
    match ipa {
        Some(ipa) => phoneme_markup(ipa, word),
        None => escape_xml(word),
    }
}

/// 将文本改写为合成标记片段序列
///
/// 返回的迭代器惰性求值且可克隆
pub fn segment_ssml<'a>(text: &'a str, voice: &'a Voice) -> SsmlSegments<'a> {
    SsmlSegments {
        voice,
        sentences: Sentences::new(text),
        pending: VecDeque::new(),
    }
}

#[derive(Debug, Clone)]
pub struct SsmlSegments<'a> {
    voice: &'a Voice,
    sentences: Sentences<'a>,
    pending: VecDeque<String>,
}

impl<'a> SsmlSegments<'a> {
    fn clean(&self, sentence: &str) -> String {
        sentence
            .chars()
            .filter(|c| !ZERO_WIDTH.contains(c))
            .map(|c| {
                if self.voice.strip_quotes() && QUOTES.contains(&c) {
                    ' '
                } else {
                    c
                }
            })
            .collect()
    }

    fn rewrite(&self, chunk: &str) -> String {
        let mut words = Vec::new();
        for token in chunk.split_whitespace() {
            if is_number(token) {
                if !self.voice.strip_numbers() {
                    words.push(token.to_string());
                }
                continue;
            }

            let core_start = token
                .char_indices()
                .find(|(_, c)| c.is_alphanumeric())
                .map(|(i, _)| i);
            let Some(core_start) = core_start else {
                words.push(escape_xml(token));
                continue;
            };
            let core_end = token
                .char_indices()
                .rev()
                .find(|(_, c)| c.is_alphanumeric())
                .map(|(i, c)| i + c.len_utf8())
                .unwrap_or(token.len());

            words.push(format!(
                "{}{}{}",
                escape_xml(&token[..core_start]),
                word_ssml(&token[core_start..core_end], self.voice),
                escape_xml(&token[core_end..]),
            ));
        }
        words.join(" ")
    }
}

impl Iterator for SsmlSegments<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(chunk) = self.pending.pop_front() {
                let ssml = self.rewrite(&chunk);
                if !ssml.is_empty() {
                    return Some(ssml);
                }
                continue;
            }
            let sentence = self.sentences.next()?;
            let cleaned = self.clean(sentence);
            self.pending
                .extend(chunk_words(cleaned.trim(), self.voice.max_segment()));
        }
    }
}

fn is_number(token: &str) -> bool {
    token.chars().any(|c| c.is_ascii_digit())
        && token
            .chars()
            .all(|c| c.is_ascii_digit() || NUMBER_PUNCTUATION.contains(&c))
}

fn escape_xml(text: &str) -> String {
    if !text.contains(['&', '<', '>']) {
        return text.to_string();
    }
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
