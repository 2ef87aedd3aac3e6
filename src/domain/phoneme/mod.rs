//! Phoneme Context - 发音改写
//!
//! 职责:
//! - 发音词典
//! - 原文 → 合成标记片段
//! - 巴利语罗马化检索

mod lexicon;
mod rewriter;
mod sentences;
mod transliterate;

pub use lexicon::Lexicon;
pub use rewriter::{phoneme_markup, segment_ssml, word_ssml, SsmlSegments, BREAK};
pub use sentences::{chunk_words, Sentences};
pub use transliterate::{romanize, romanize_pattern};
