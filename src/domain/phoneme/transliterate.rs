//! 巴利语罗马化
//!
//! 去除变音符号，以及将无变音符号的检索词扩展为匹配变音字母的正则

use regex::{Regex, RegexBuilder};

/// 去除变音符号，保留大小写
pub fn romanize(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'ā' => 'a',
            'Ā' => 'A',
            'ī' => 'i',
            'Ī' => 'I',
            'ū' => 'u',
            'Ū' => 'U',
            'ṁ' | 'ṃ' => 'm',
            'Ṁ' | 'Ṃ' => 'M',
            'ḍ' => 'd',
            'Ḍ' => 'D',
            'ṅ' | 'ñ' | 'ṇ' => 'n',
            'Ṅ' | 'Ñ' | 'Ṇ' => 'N',
            'ḷ' => 'l',
            'Ḷ' => 'L',
            'ṭ' => 't',
            'Ṭ' => 'T',
            other => other,
        })
        .collect()
}

/// 构造忽略变音符号的检索正则
///
/// 每个无变音字母匹配其所有变音形式，其他字符按字面匹配
pub fn romanize_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    let mut source = String::with_capacity(pattern.len() * 4);
    for c in pattern.chars() {
        let class = match c.to_ascii_lowercase() {
            'a' => Some("[aā]"),
            'i' => Some("[iī]"),
            'u' => Some("[uū]"),
            'm' => Some("[mṁṃ]"),
            'd' => Some("[dḍ]"),
            'n' => Some("[nṅñṇ]"),
            'l' => Some("[lḷ]"),
            't' => Some("[tṭ]"),
            _ => None,
        };
        match class {
            Some(class) => source.push_str(class),
            None => source.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }
    RegexBuilder::new(&source).case_insensitive(true).build()
}
