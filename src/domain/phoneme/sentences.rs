//! 句子切分
//!
//! 按句末标点和换行切分，超长句子再按词打包为不超过上限的块

/// 句末标点
#[inline]
fn is_strong_delimiter(ch: char) -> bool {
    matches!(ch, '。' | '？' | '！' | '.' | '?' | '!' | ';')
}

/// 紧跟句末标点的闭合引号
#[inline]
fn is_closing_quote(ch: char) -> bool {
    matches!(ch, '"' | '\'' | '\u{201D}' | '\u{2019}' | ')')
}

/// 惰性句子迭代器
#[derive(Debug, Clone)]
pub struct Sentences<'a> {
    rest: &'a str,
}

impl<'a> Sentences<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { rest: text }
    }

    /// 返回下一个句子结束的字节位置（不含）及下一句开始位置
    fn boundary(&self) -> (usize, usize) {
        let mut chars = self.rest.char_indices().peekable();
        while let Some((i, ch)) = chars.next() {
            if ch == '\n' {
                return (i, i + 1);
            }
            if is_strong_delimiter(ch) {
                let mut end = i + ch.len_utf8();
                while let Some(&(j, next)) = chars.peek() {
                    if is_closing_quote(next) {
                        end = j + next.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                match chars.peek() {
                    None => return (end, end),
                    Some(&(_, next)) if next.is_whitespace() => return (end, end),
                    _ => {}
                }
            }
        }
        (self.rest.len(), self.rest.len())
    }
}

impl<'a> Iterator for Sentences<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.rest.is_empty() {
            let (end, next_start) = self.boundary();
            let sentence = self.rest[..end].trim();
            self.rest = &self.rest[next_start..];
            if !sentence.is_empty() {
                return Some(sentence);
            }
        }
        None
    }
}

/// 按词打包，每块字符数不超过 max_chars
///
/// 单个超长词独占一块
pub fn chunk_words(sentence: &str, max_chars: usize) -> Vec<String> {
    if sentence.chars().count() <= max_chars {
        return vec![sentence.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in sentence.split_whitespace() {
        let word_len = word.chars().count();
        if current_len > 0 && current_len + 1 + word_len > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_on_sentence_end() {
        let sentences: Vec<_> = Sentences::new("Thus have I heard. At one time? Yes!").collect();
        assert_eq!(sentences, vec!["Thus have I heard.", "At one time?", "Yes!"]);
    }

    #[test]
    fn test_decimal_point_does_not_split() {
        let sentences: Vec<_> = Sentences::new("See sn1.2 for details.").collect();
        assert_eq!(sentences, vec!["See sn1.2 for details."]);
    }

    #[test]
    fn test_closing_quote_stays_with_sentence() {
        let sentences: Vec<_> = Sentences::new("He said “go.” Then left.").collect();
        assert_eq!(sentences, vec!["He said “go.”", "Then left."]);
    }

    #[test]
    fn test_newlines_split_and_blank_lines_skip() {
        let sentences: Vec<_> = Sentences::new("one\n\n  two  \n").collect();
        assert_eq!(sentences, vec!["one", "two"]);
        assert_eq!(Sentences::new("   ").count(), 0);
    }

    #[test]
    fn test_chunk_words_respects_limit() {
        let chunks = chunk_words("aa bb cc dd", 5);
        assert_eq!(chunks, vec!["aa bb", "cc dd"]);
        assert!(chunks.iter().all(|c| c.chars().count() <= 5));

        assert_eq!(chunk_words("short", 100), vec!["short"]);
        assert_eq!(chunk_words("abcdefgh ij", 4), vec!["abcdefgh", "ij"]);
    }
}
