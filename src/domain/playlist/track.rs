//! Playlist Context - Entities

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// 一个文本段，按语言保存各版本文本
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackSegment {
    segment_id: String,
    #[serde(default)]
    texts: BTreeMap<String, String>,
}

impl TrackSegment {
    pub fn new(segment_id: impl Into<String>) -> Self {
        Self {
            segment_id: segment_id.into(),
            texts: BTreeMap::new(),
        }
    }

    pub fn with_text(mut self, language: &str, text: impl Into<String>) -> Self {
        self.texts.insert(language.to_string(), text.into());
        self
    }

    pub fn segment_id(&self) -> &str {
        &self.segment_id
    }

    /// 指定语言的非空文本
    pub fn text(&self, language: &str) -> Option<&str> {
        self.texts
            .get(language)
            .map(String::as_str)
            .filter(|text| !text.trim().is_empty())
    }

    pub fn texts(&self) -> &BTreeMap<String, String> {
        &self.texts
    }
}

/// 一个文档对应的轨道
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    document_id: String,
    segments: Vec<TrackSegment>,
}

impl Track {
    pub fn new(document_id: impl Into<String>, segments: Vec<TrackSegment>) -> Self {
        Self {
            document_id: document_id.into(),
            segments,
        }
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn segments(&self) -> &[TrackSegment] {
        &self.segments
    }
}
