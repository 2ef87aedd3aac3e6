//! Playlist Context - Aggregate Root

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{PlaylistError, Track, TrackSegment};

/// 默认朗读语言顺序
pub const DEFAULT_LANGUAGES: &[&str] = &["pli", "en"];

/// 每字符估算朗读时长 (秒)，以 1/100000 秒为单位
const MICROS_PER_CHAR: u64 = 8865;
const MICROS_SCALE: u64 = 100_000;

/// 播放列表统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistStats {
    pub tracks: usize,
    pub chars: BTreeMap<String, usize>,
    pub segments: BTreeMap<String, usize>,
    /// 估算时长 (秒)，向上取整
    pub duration: u64,
}

/// 播放列表聚合根
///
/// 不变量:
/// - languages 决定每段内的朗读顺序
/// - max_seconds == 0 表示不限时长
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    languages: Vec<String>,
    max_seconds: u64,
    tracks: Vec<Track>,
}

impl Default for Playlist {
    fn default() -> Self {
        Self::new(DEFAULT_LANGUAGES.iter().map(|s| s.to_string()).collect())
    }
}

impl Playlist {
    pub fn new(languages: Vec<String>) -> Self {
        Self {
            languages,
            max_seconds: 0,
            tracks: Vec::new(),
        }
    }

    pub fn with_max_seconds(mut self, max_seconds: u64) -> Self {
        self.max_seconds = max_seconds;
        self
    }

    pub fn add_track(&mut self, track: Track) {
        self.tracks.push(track);
    }

    /// 添加只含一条提示信息的错误轨道
    ///
    /// 使用第一个非巴利语的语言朗读
    pub fn add_error_track(&mut self, label: &str, message: &str) {
        let language = self.message_language().to_string();
        let segment = TrackSegment::new(format!("{label}:0.1")).with_text(&language, message);
        self.tracks.push(Track::new(label, vec![segment]));
    }

    fn message_language(&self) -> &str {
        self.languages
            .iter()
            .find(|lang| lang.as_str() != "pli")
            .or_else(|| self.languages.first())
            .map(String::as_str)
            .unwrap_or("en")
    }

    pub fn stats(&self) -> PlaylistStats {
        let mut stats = PlaylistStats {
            tracks: self.tracks.len(),
            ..PlaylistStats::default()
        };
        for segment in self.tracks.iter().flat_map(Track::segments) {
            for language in &self.languages {
                if let Some(text) = segment.text(language) {
                    *stats.chars.entry(language.clone()).or_default() += text.chars().count();
                    *stats.segments.entry(language.clone()).or_default() += 1;
                }
            }
        }
        let total_chars: usize = stats.chars.values().sum();
        stats.duration = (total_chars as u64 * MICROS_PER_CHAR).div_ceil(MICROS_SCALE);
        stats
    }

    /// 校验朗读语言与时长限制
    pub fn validate(&self) -> Result<(), PlaylistError> {
        if self.languages.is_empty() {
            return Err(PlaylistError::NoLanguages);
        }
        if self.max_seconds == 0 {
            return Ok(());
        }
        let duration = self.stats().duration;
        if duration > self.max_seconds {
            return Err(PlaylistError::DurationExceeded {
                duration,
                max_seconds: self.max_seconds,
            });
        }
        Ok(())
    }

    /// 超出时长限制时替换为仅含错误轨道的列表
    pub fn enforce_duration_limit(self) -> Self {
        match self.validate() {
            Err(e @ PlaylistError::DurationExceeded { .. }) => {
                let mut limited = Playlist::new(self.languages);
                limited.add_error_track("duration-limit", &e.to_string());
                limited
            }
            _ => self,
        }
    }

    /// 所有轨道的段数
    pub fn segment_count(&self) -> usize {
        self.tracks.iter().map(|track| track.segments().len()).sum()
    }

    // Getters
    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    pub fn max_seconds(&self) -> u64 {
        self.max_seconds
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(id: &str, de: usize, pli: usize) -> TrackSegment {
        TrackSegment::new(id)
            .with_text("de", "d".repeat(de))
            .with_text("pli", "p".repeat(pli))
    }

    fn de_playlist() -> Playlist {
        Playlist::new(vec!["pli".into(), "de".into()])
    }

    #[test]
    fn test_default_languages() {
        let playlist = Playlist::default();
        assert_eq!(playlist.languages(), &["pli".to_string(), "en".to_string()]);
        assert_eq!(playlist.max_seconds(), 0);
    }

    #[test]
    fn test_stats_single_segment() {
        let mut playlist = de_playlist();
        playlist.add_track(Track::new("test1", vec![segment("test1:1.1", 22, 24)]));

        let stats = playlist.stats();
        assert_eq!(stats.tracks, 1);
        assert_eq!(stats.chars["de"], 22);
        assert_eq!(stats.chars["pli"], 24);
        assert_eq!(stats.segments["de"], 1);
        assert_eq!(stats.duration, 5);
    }

    #[test]
    fn test_stats_multiple_tracks() {
        let mut playlist = de_playlist();
        playlist.add_track(Track::new("test1", vec![segment("test1:1.1", 22, 24)]));
        playlist.add_track(Track::new("test2", vec![segment("test2:1.1", 11, 24)]));

        let stats = playlist.stats();
        assert_eq!(stats.tracks, 2);
        assert_eq!(stats.chars["de"], 33);
        assert_eq!(stats.chars["pli"], 48);
        assert_eq!(stats.segments["pli"], 2);
        assert_eq!(stats.duration, 8);
        assert_eq!(playlist.segment_count(), 2);
    }

    #[test]
    fn test_stats_ignores_other_languages() {
        let mut playlist = de_playlist();
        let seg = segment("x:1", 10, 0).with_text("fr", "ignored text");
        playlist.add_track(Track::new("x", vec![seg]));

        let stats = playlist.stats();
        assert!(!stats.chars.contains_key("fr"));
        assert!(!stats.chars.contains_key("pli"));
    }

    #[test]
    fn test_error_track_uses_first_non_pali_language() {
        let mut playlist = Playlist::default();
        playlist.add_error_track("test-error", "Test error 1");

        let stats = playlist.stats();
        assert_eq!(stats.tracks, 1);
        assert_eq!(stats.chars["en"], 12);
        assert_eq!(stats.segments["en"], 1);
        assert_eq!(stats.duration, 2);

        let track = &playlist.tracks()[0];
        assert_eq!(track.document_id(), "test-error");
        assert_eq!(track.segments()[0].segment_id(), "test-error:0.1");
    }

    #[test]
    fn test_duration_limit() {
        let mut playlist = de_playlist().with_max_seconds(6);
        playlist.add_track(Track::new("test1", vec![segment("test1:1.1", 22, 24)]));
        assert!(playlist.validate().is_ok());

        playlist.add_track(Track::new("test2", vec![segment("test2:1.1", 11, 24)]));
        assert!(matches!(
            playlist.validate(),
            Err(PlaylistError::DurationExceeded { duration: 8, max_seconds: 6 })
        ));

        let limited = playlist.enforce_duration_limit();
        assert_eq!(limited.tracks().len(), 1);
        assert_eq!(limited.tracks()[0].document_id(), "duration-limit");
        assert!(limited.stats().chars.contains_key("de"));
    }

    #[test]
    fn test_zero_max_seconds_is_unlimited() {
        let mut playlist = de_playlist();
        playlist.add_track(Track::new("t", vec![segment("t:1", 5000, 5000)]));
        assert!(playlist.validate().is_ok());
    }

    #[test]
    fn test_empty_speaking_order_is_invalid() {
        let playlist = Playlist::new(vec![]);
        assert!(matches!(playlist.validate(), Err(PlaylistError::NoLanguages)));
    }
}
