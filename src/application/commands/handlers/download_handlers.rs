//! Download Command Handlers
//!
//! 构建在后台 tokio 任务中执行，调用方通过任务 id 轮询进度

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;

use crate::application::commands::download_commands::{BuildDownloadCommand, BuildDownloadResponse};
use crate::application::error::ApplicationError;
use crate::application::playlist::{AssembleRequest, AssembledAudio, PlaylistAssembler};
use crate::application::ports::{DownloadMetadata, TaskManagerPort};
use crate::domain::playlist::Playlist;
use crate::domain::voice::{AudioFormat, Voice, VoiceCatalog};
use crate::domain::ProgressTask;

/// 已结束任务的保留时间
const TASK_RETENTION_HOURS: i64 = 6;

/// 下载构建的默认参数
#[derive(Debug, Clone)]
pub struct DownloadSettings {
    pub languages: Vec<String>,
    /// 语言 → 默认音色名
    pub voices: BTreeMap<String, String>,
    pub format: AudioFormat,
    /// 0 表示不限
    pub max_seconds: u64,
    /// 输出所在 volume
    pub volume: String,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            languages: vec!["pli".to_string(), "en".to_string()],
            voices: BTreeMap::from([
                ("pli".to_string(), "Aditi".to_string()),
                ("en".to_string(), "Amy".to_string()),
            ]),
            format: AudioFormat::Mp3,
            max_seconds: 0,
            volume: "playlist".to_string(),
        }
    }
}

/// BuildDownload Handler - 启动下载构建
pub struct BuildDownloadHandler {
    assembler: PlaylistAssembler,
    catalog: Arc<VoiceCatalog>,
    task_manager: Arc<dyn TaskManagerPort>,
    settings: DownloadSettings,
}

impl BuildDownloadHandler {
    pub fn new(
        assembler: PlaylistAssembler,
        catalog: Arc<VoiceCatalog>,
        task_manager: Arc<dyn TaskManagerPort>,
        settings: DownloadSettings,
    ) -> Self {
        Self {
            assembler,
            catalog,
            task_manager,
            settings,
        }
    }

    /// 朗读顺序中每个语言的音色
    fn resolve_voices(
        &self,
        languages: &[String],
        requested: &BTreeMap<String, String>,
    ) -> Result<BTreeMap<String, Voice>, ApplicationError> {
        let mut voices = BTreeMap::new();
        for language in languages {
            let name = requested
                .get(language)
                .or_else(|| self.settings.voices.get(language))
                .ok_or_else(|| {
                    ApplicationError::validation(format!("no voice for language {language}"))
                })?;
            let voice = self.catalog.voice_of_name(name)?;
            voices.insert(language.clone(), voice.clone());
        }
        Ok(voices)
    }

    pub async fn handle(
        &self,
        cmd: BuildDownloadCommand,
    ) -> Result<BuildDownloadResponse, ApplicationError> {
        let label = cmd.label.trim().to_string();
        if label.is_empty() {
            return Err(ApplicationError::validation("label is required"));
        }
        if cmd.tracks.is_empty() {
            return Err(ApplicationError::validation("no tracks to build"));
        }

        let languages = cmd
            .languages
            .filter(|langs| !langs.is_empty())
            .unwrap_or_else(|| self.settings.languages.clone());
        let voices = self.resolve_voices(&languages, &cmd.voices)?;
        let format = cmd.format.unwrap_or(self.settings.format);

        let mut playlist = Playlist::new(languages)
            .with_max_seconds(cmd.max_seconds.unwrap_or(self.settings.max_seconds));
        for track in cmd.tracks {
            playlist.add_track(track);
        }

        self.task_manager
            .cleanup_before(Utc::now() - chrono::Duration::hours(TASK_RETENTION_HOURS));

        let task = Arc::new(ProgressTask::new(format!("download {label}")));
        task.start(format!("Building {label}"));
        self.task_manager.register(task.clone())?;

        let task_id = task.id().to_string();
        tracing::info!(
            task_id = %task_id,
            label = %label,
            tracks = playlist.tracks().len(),
            segments = playlist.segment_count(),
            format = %format,
            "Download build started"
        );

        let build = DownloadBuild {
            assembler: self.assembler.clone().with_format(format),
            task_manager: self.task_manager.clone(),
            volume: self.settings.volume.clone(),
            label,
            voices,
            task: task.clone(),
        };
        tokio::spawn(build.run(playlist));

        Ok(BuildDownloadResponse {
            task_id,
            task: task.snapshot(),
        })
    }
}

/// 一次后台构建
struct DownloadBuild {
    assembler: PlaylistAssembler,
    task_manager: Arc<dyn TaskManagerPort>,
    volume: String,
    label: String,
    voices: BTreeMap<String, Voice>,
    task: Arc<ProgressTask>,
}

impl DownloadBuild {
    async fn run(self, playlist: Playlist) {
        let languages = playlist.languages().to_vec();
        let result = self
            .assembler
            .assemble(AssembleRequest {
                playlist,
                voices: &self.voices,
                volume: &self.volume,
                label: &self.label,
                task: Some(&self.task),
            })
            .await;

        match result {
            Ok(audio) => self.record(&audio, None),
            Err(e) => {
                tracing::error!(task_id = %self.task.id(), error = %e, "Download build failed");
                self.task.fail(e.to_string());
                self.build_error_track(languages, e.to_string()).await;
            }
        }
    }

    /// 构建失败时生成朗读错误信息的音频
    ///
    /// 错误信息没有真人录音，真人音色换成其后备音色
    async fn build_error_track(&self, languages: Vec<String>, message: String) {
        let mut playlist = Playlist::new(languages);
        playlist.add_error_track(&self.label, &format!("Audio build failed. {message}"));

        let voices: BTreeMap<String, Voice> = self
            .voices
            .iter()
            .map(|(language, voice)| {
                let voice = match voice.fallback() {
                    Some(fallback) if voice.backend().is_human() => fallback.clone(),
                    _ => voice.clone(),
                };
                (language.clone(), voice)
            })
            .collect();

        let result = self
            .assembler
            .assemble(AssembleRequest {
                playlist,
                voices: &voices,
                volume: &self.volume,
                label: &self.label,
                task: None,
            })
            .await;

        match result {
            Ok(audio) => self.record(&audio, Some(message)),
            Err(e) => {
                tracing::warn!(task_id = %self.task.id(), error = %e, "Error track could not be built");
            }
        }
    }

    fn record(&self, audio: &AssembledAudio, error: Option<String>) {
        let metadata = DownloadMetadata {
            content_type: audio.format.content_type().to_string(),
            filename: audio.filename.clone(),
            guid: audio.guid().to_string(),
            volume: audio.volume.clone(),
            format: audio.format,
            stats: audio.stats.clone(),
            build_timestamp: Utc::now(),
            error,
        };
        if let Err(e) = self.task_manager.complete(self.task.id(), metadata) {
            tracing::warn!(task_id = %self.task.id(), error = %e, "Build result not recorded");
            return;
        }
        tracing::info!(
            task_id = %self.task.id(),
            guid = %audio.guid(),
            filename = %audio.filename,
            cached = audio.cached,
            "Download build finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::TtsError;
    use crate::application::synthesis::{RetryPolicy, SynthesisBackendFactory};
    use crate::domain::playlist::{Track, TrackSegment};
    use crate::domain::TaskState;
    use crate::infrastructure::adapters::{FakeArchiveClient, FakeTtsClient, StreamConcatenator};
    use crate::infrastructure::memory::InMemoryTaskManager;
    use crate::infrastructure::persistence::{FileAudioCache, FileCacheConfig};
    use std::time::Duration;
    use tempfile::TempDir;

    async fn handler_with(
        dir: &TempDir,
        tts: FakeTtsClient,
        catalog: VoiceCatalog,
    ) -> (BuildDownloadHandler, Arc<InMemoryTaskManager>) {
        let cache = FileAudioCache::new(FileCacheConfig {
            root: dir.path().to_path_buf(),
            ephemeral_age: Duration::from_secs(60),
        })
        .await
        .unwrap()
        .arc();
        let factory = SynthesisBackendFactory::new(
            Arc::new(tts),
            Arc::new(FakeArchiveClient::new()),
            cache,
            Arc::new(StreamConcatenator::new()),
        )
        .with_retry(RetryPolicy::no_retry(), RetryPolicy::no_retry());
        let tasks = InMemoryTaskManager::new().arc();
        let handler = BuildDownloadHandler::new(
            PlaylistAssembler::new(factory, AudioFormat::Mp3),
            Arc::new(catalog),
            tasks.clone(),
            DownloadSettings::default(),
        );
        (handler, tasks)
    }

    async fn handler(dir: &TempDir) -> (BuildDownloadHandler, Arc<InMemoryTaskManager>) {
        handler_with(dir, FakeTtsClient::new(), VoiceCatalog::builtin()).await
    }

    fn track() -> Track {
        Track::new(
            "an1.1",
            vec![TrackSegment::new("an1.1:1.1")
                .with_text("pli", "Evaṃ me sutaṃ.")
                .with_text("en", "So I have heard.")],
        )
    }

    async fn wait_for_result(tasks: &InMemoryTaskManager, task_id: &str) -> DownloadMetadata {
        for _ in 0..200 {
            if let Some(result) = tasks.get_result(task_id) {
                return result;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("build did not finish");
    }

    #[tokio::test]
    async fn test_build_completes_in_background() {
        let dir = TempDir::new().unwrap();
        let (handler, tasks) = handler(&dir).await;

        let response = handler
            .handle(BuildDownloadCommand {
                label: "an1.1".to_string(),
                tracks: vec![track()],
                ..Default::default()
            })
            .await
            .unwrap();

        let result = wait_for_result(&tasks, &response.task_id).await;
        assert_eq!(result.filename, "an1.1_pli+en_Amy.mp3");
        assert_eq!(result.content_type, "audio/mp3");
        assert!(result.error.is_none());

        let task = tasks.get_task(&response.task_id).unwrap();
        assert_eq!(task.state(), TaskState::Done);
        assert_eq!(task.actions_total(), 1 + 2);
    }

    #[tokio::test]
    async fn test_unknown_voice_is_rejected_up_front() {
        let dir = TempDir::new().unwrap();
        let (handler, tasks) = handler(&dir).await;

        let result = handler
            .handle(BuildDownloadCommand {
                label: "an1.1".to_string(),
                tracks: vec![track()],
                voices: BTreeMap::from([("en".to_string(), "Nobody".to_string())]),
                ..Default::default()
            })
            .await;
        assert!(matches!(result, Err(ApplicationError::ValidationError(_))));
        assert!(tasks.is_empty());
    }

    #[tokio::test]
    async fn test_failed_build_records_error_track() {
        let dir = TempDir::new().unwrap();
        let tts = FakeTtsClient::with_failures([TtsError::InvalidRequest("bad ssml".into())]);
        let (handler, tasks) = handler_with(&dir, tts, VoiceCatalog::builtin()).await;

        let response = handler
            .handle(BuildDownloadCommand {
                label: "an1.1".to_string(),
                tracks: vec![track()],
                ..Default::default()
            })
            .await
            .unwrap();

        let result = wait_for_result(&tasks, &response.task_id).await;
        assert!(result.error.is_some());
        assert_eq!(result.stats.tracks, 1);
        let task = tasks.get_task(&response.task_id).unwrap();
        assert_eq!(task.state(), TaskState::Failed);
        assert!(task.summary().starts_with("Error: "));
    }

    #[tokio::test]
    async fn test_missing_recording_without_fallback_fails_task() {
        let dir = TempDir::new().unwrap();
        let mut catalog = VoiceCatalog::builtin();
        catalog
            .insert(Voice::human("reader_only", "en-AU", "sujato"))
            .unwrap();
        let (handler, tasks) = handler_with(&dir, FakeTtsClient::new(), catalog).await;

        let response = handler
            .handle(BuildDownloadCommand {
                label: "an1.1".to_string(),
                tracks: vec![track()],
                voices: BTreeMap::from([("en".to_string(), "reader_only".to_string())]),
                ..Default::default()
            })
            .await
            .unwrap();

        let task = tasks.get_task(&response.task_id).unwrap();
        for _ in 0..200 {
            if task.state() == TaskState::Failed {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(task.state(), TaskState::Failed);
        assert!(task.error().unwrap().contains("no recording"));
    }
}
