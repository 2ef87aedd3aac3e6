//! Fake Archive Client - 内存中的录音归档

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::application::ports::{ArchiveError, RecordedAudioPort, RecordedClipRequest};

/// 以 (reader, document_id, segment_id) 为键的录音表
#[derive(Default)]
pub struct FakeArchiveClient {
    clips: DashMap<(String, String, String), Vec<u8>>,
    calls: AtomicUsize,
}

impl FakeArchiveClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clip(self, reader: &str, document_id: &str, segment_id: &str, audio: &[u8]) -> Self {
        self.clips.insert(
            (
                reader.to_string(),
                document_id.to_string(),
                segment_id.to_string(),
            ),
            audio.to_vec(),
        );
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordedAudioPort for FakeArchiveClient {
    async fn fetch_recorded_clip(
        &self,
        request: &RecordedClipRequest,
    ) -> Result<Option<Vec<u8>>, ArchiveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let key = (
            request.reader.clone(),
            request.document_id.clone(),
            request.segment_id.clone(),
        );
        Ok(self.clips.get(&key).map(|clip| clip.value().clone()))
    }
}
