//! Playlist Assembler
//!
//! 逐轨道、按朗读顺序逐语言合成各段，轨道之间插入停顿，
//! 拼接为单个音频文件并以聚合签名缓存

use std::collections::BTreeMap;
use std::sync::Arc;

use futures_util::{stream, StreamExt, TryStreamExt};
use serde_json::{Map, Value};

use crate::application::ports::{AudioCachePort, AudioConcatenatorPort};
use crate::application::synthesis::{
    SegmentRequest, SynthesisBackend, SynthesisBackendFactory, SynthesisError, SynthesisResult,
};
use crate::domain::playlist::{Playlist, PlaylistError, PlaylistStats};
use crate::domain::voice::{AudioFormat, Voice};
use crate::domain::{ProgressTask, Signature};

/// 聚合签名 api
pub const PLAYLIST_API: &str = "playlist";

/// 段合成之外的固定步骤：停顿合成、拼接存储
pub const OVERHEAD_STEPS: u64 = 2;

/// 组装结果
#[derive(Debug, Clone)]
pub struct AssembledAudio {
    pub audio: Vec<u8>,
    pub signature: Signature,
    pub stats: PlaylistStats,
    pub format: AudioFormat,
    pub volume: String,
    pub filename: String,
    /// 拼接结果直接来自缓存
    pub cached: bool,
}

impl AssembledAudio {
    pub fn guid(&self) -> &str {
        self.signature.guid()
    }
}

/// 一次组装请求
pub struct AssembleRequest<'a> {
    pub playlist: Playlist,
    /// 语言 → 音色
    pub voices: &'a BTreeMap<String, Voice>,
    /// 输出所在 volume
    pub volume: &'a str,
    /// 文件名前缀
    pub label: &'a str,
    pub task: Option<&'a ProgressTask>,
}

struct SegmentJob {
    track: usize,
    requests: Vec<(Arc<dyn SynthesisBackend>, SegmentRequest)>,
}

#[derive(Clone)]
pub struct PlaylistAssembler {
    factory: SynthesisBackendFactory,
    format: AudioFormat,
    break_seconds: f32,
    max_concurrent: usize,
}

impl PlaylistAssembler {
    pub fn new(factory: SynthesisBackendFactory, format: AudioFormat) -> Self {
        Self {
            factory,
            format,
            break_seconds: 1.5,
            max_concurrent: 4,
        }
    }

    pub fn with_break_seconds(mut self, seconds: f32) -> Self {
        self.break_seconds = seconds;
        self
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    pub fn with_format(mut self, format: AudioFormat) -> Self {
        self.format = format;
        self
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    fn cache(&self) -> &dyn AudioCachePort {
        self.factory.cache().as_ref()
    }

    fn concatenator(&self) -> &dyn AudioConcatenatorPort {
        self.factory.concatenator().as_ref()
    }

    /// 组装播放列表
    ///
    /// 超出时长限制的列表在合成开始前被替换为错误轨道
    pub async fn assemble(
        &self,
        request: AssembleRequest<'_>,
    ) -> Result<AssembledAudio, SynthesisError> {
        let AssembleRequest {
            playlist,
            voices,
            volume,
            label,
            task,
        } = request;

        let playlist = playlist.enforce_duration_limit();
        playlist.validate().map_err(invalid_playlist)?;
        let stats = playlist.stats();
        if stats.segments.is_empty() {
            return Err(SynthesisError::InvalidInput(
                "playlist has no speakable segments".to_string(),
            ));
        }

        // 朗读顺序中实际出现的语言及其后端
        let mut backends: Vec<(String, Arc<dyn SynthesisBackend>)> = Vec::new();
        for language in playlist.languages() {
            if !stats.segments.contains_key(language) {
                continue;
            }
            let voice = voices.get(language).ok_or_else(|| {
                SynthesisError::InvalidInput(format!("no voice for language {language}"))
            })?;
            backends.push((language.clone(), self.factory.backend_for(voice, self.format)?));
        }

        let segment_count = playlist.segment_count() as u64;
        if let Some(task) = task {
            task.set_total(segment_count + OVERHEAD_STEPS);
            task.set_summary(format!("Synthesizing {segment_count} segments"));
        }

        let pause = self.synthesize_break(&backends).await?;
        advance(task);

        let jobs = segment_jobs(&playlist, &backends);
        let segments: Vec<(usize, Vec<SynthesisResult>)> = stream::iter(jobs)
            .map(|job| async move {
                let mut results = Vec::with_capacity(job.requests.len());
                for (backend, request) in &job.requests {
                    results.push(backend.synthesize(request).await?);
                }
                advance(task);
                Ok::<_, SynthesisError>((job.track, results))
            })
            .buffered(self.max_concurrent)
            .try_collect()
            .await?;

        if let Some(task) = task {
            task.set_summary("Assembling audio");
        }

        // 轨道之间插入停顿
        let mut clips: Vec<&SynthesisResult> = Vec::new();
        let mut previous_track = None;
        for (track, results) in &segments {
            if results.is_empty() {
                continue;
            }
            if previous_track.is_some_and(|prev| prev != *track) {
                clips.push(&pause);
            }
            previous_track = Some(*track);
            clips.extend(results.iter());
        }

        let signature = self.playlist_signature(&playlist, &backends, &clips)?;
        let suffix = self.format.suffix();
        let cache = self.cache();

        let (audio, cached) = match cache.retrieve(signature.guid(), Some(volume), &suffix).await {
            Ok(Some(audio)) => (audio, true),
            Ok(None) => (self.concat_and_store(&signature, volume, &clips).await?, false),
            Err(e) => {
                tracing::warn!(guid = %signature.guid(), error = %e, "Cache read failed, treating as miss");
                (self.concat_and_store(&signature, volume, &clips).await?, false)
            }
        };
        cache.add_ephemeral(signature.guid());
        advance(task);

        let filename = self.filename(label, &backends);
        if let Some(task) = task {
            task.set_summary(format!("Assembled {filename}"));
        }

        let hits: usize = segments.iter().flat_map(|(_, r)| r).map(|r| r.hits).sum();
        let misses: usize = segments.iter().flat_map(|(_, r)| r).map(|r| r.misses).sum();
        tracing::info!(
            guid = %signature.guid(),
            volume = %volume,
            tracks = stats.tracks,
            clips = clips.len(),
            hits,
            misses,
            cached,
            "Playlist assembled"
        );

        Ok(AssembledAudio {
            audio,
            signature,
            stats,
            format: self.format,
            volume: volume.to_string(),
            filename,
            cached,
        })
    }

    /// 朗读顺序中第一个能合成停顿的音色
    async fn synthesize_break(
        &self,
        backends: &[(String, Arc<dyn SynthesisBackend>)],
    ) -> Result<SynthesisResult, SynthesisError> {
        for (language, backend) in backends {
            match backend.synthesize_break(self.break_seconds).await {
                Ok(pause) => return Ok(pause),
                Err(SynthesisError::Unavailable(reason)) => {
                    tracing::debug!(language = %language, reason = %reason, "Voice cannot synthesize breaks");
                }
                Err(e) => return Err(e),
            }
        }
        Err(SynthesisError::Unavailable(
            "no voice can synthesize breaks".to_string(),
        ))
    }

    fn playlist_signature(
        &self,
        playlist: &Playlist,
        backends: &[(String, Arc<dyn SynthesisBackend>)],
        clips: &[&SynthesisResult],
    ) -> Result<Signature, SynthesisError> {
        let voices: Map<String, Value> = backends
            .iter()
            .map(|(language, backend)| (language.clone(), Value::from(backend.voice().name())))
            .collect();

        let mut fields = Map::new();
        fields.insert("api".into(), Value::from(PLAYLIST_API));
        fields.insert(
            "audioFormat".into(),
            Value::from(self.format.provider_format()),
        );
        fields.insert(
            "languages".into(),
            Value::Array(playlist.languages().iter().map(|l| Value::from(l.as_str())).collect()),
        );
        fields.insert("voices".into(), Value::Object(voices));
        fields.insert(
            "files".into(),
            Value::Array(clips.iter().map(|c| Value::from(c.guid())).collect()),
        );
        Ok(Signature::seal(fields)?)
    }

    async fn concat_and_store(
        &self,
        signature: &Signature,
        volume: &str,
        clips: &[&SynthesisResult],
    ) -> Result<Vec<u8>, SynthesisError> {
        let parts: Vec<&[u8]> = clips.iter().map(|c| c.audio.as_slice()).collect();
        let audio = self.concatenator().concat(self.format, &parts)?;

        let cache = self.cache();
        let guid = signature.guid();
        if let Err(e) = cache
            .store(guid, Some(volume), &self.format.suffix(), &audio)
            .await
        {
            tracing::error!(guid = %guid, volume = %volume, error = %e, "Cache write failed");
            return Err(e.into());
        }
        cache
            .store_signature(guid, Some(volume), signature.as_value())
            .await?;
        Ok(audio)
    }

    /// `{label}_{langs}_{voice}.{ext}`，voice 为朗读顺序中最后一个语言的音色
    fn filename(&self, label: &str, backends: &[(String, Arc<dyn SynthesisBackend>)]) -> String {
        let languages: Vec<&str> = backends.iter().map(|(l, _)| l.as_str()).collect();
        let voice = backends
            .last()
            .map(|(_, backend)| backend.voice().name())
            .unwrap_or_default();
        let stem: String = format!("{}_{}_{}", label, languages.join("+"), voice)
            .chars()
            .map(|c| if c.is_alphanumeric() || "+-_.".contains(c) { c } else { '_' })
            .collect();
        format!("{stem}.{}", self.format.extension())
    }
}

fn advance(task: Option<&ProgressTask>) {
    if let Some(task) = task {
        task.advance();
    }
}

fn invalid_playlist(err: PlaylistError) -> SynthesisError {
    SynthesisError::InvalidInput(err.to_string())
}

fn segment_jobs(
    playlist: &Playlist,
    backends: &[(String, Arc<dyn SynthesisBackend>)],
) -> Vec<SegmentJob> {
    let mut jobs = Vec::with_capacity(playlist.segment_count());
    for (index, track) in playlist.tracks().iter().enumerate() {
        for segment in track.segments() {
            let requests = backends
                .iter()
                .filter_map(|(language, backend)| {
                    segment.text(language).map(|text| {
                        let request = SegmentRequest::text(text, language)
                            .with_ids(track.document_id(), segment.segment_id());
                        (backend.clone(), request)
                    })
                })
                .collect();
            jobs.push(SegmentJob {
                track: index,
                requests,
            });
        }
    }
    jobs
}
