//! In-Memory Task Manager Implementation

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;

use crate::application::ports::{DownloadMetadata, TaskError, TaskManagerPort};
use crate::domain::ProgressTask;

struct TaskEntry {
    task: Arc<ProgressTask>,
    result: Option<DownloadMetadata>,
    registered_at: DateTime<Utc>,
}

/// 内存任务管理器
///
/// task_id -> (进度任务, 构建结果)
#[derive(Default)]
pub struct InMemoryTaskManager {
    tasks: DashMap<String, TaskEntry>,
}

impl InMemoryTaskManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl TaskManagerPort for InMemoryTaskManager {
    fn register(&self, task: Arc<ProgressTask>) -> Result<(), TaskError> {
        let task_id = task.id().to_string();
        match self.tasks.entry(task_id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(TaskError::AlreadyExists(task_id)),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(TaskEntry {
                    task,
                    result: None,
                    registered_at: Utc::now(),
                });
                tracing::debug!(task_id = %task_id, "Task registered");
                Ok(())
            }
        }
    }

    fn get_task(&self, task_id: &str) -> Option<Arc<ProgressTask>> {
        self.tasks.get(task_id).map(|entry| entry.task.clone())
    }

    fn complete(&self, task_id: &str, metadata: DownloadMetadata) -> Result<(), TaskError> {
        let mut entry = self
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| TaskError::NotFound(task_id.to_string()))?;

        tracing::debug!(
            task_id = %task_id,
            guid = %metadata.guid,
            failed = metadata.error.is_some(),
            "Task result recorded"
        );
        entry.result = Some(metadata);
        Ok(())
    }

    fn get_result(&self, task_id: &str) -> Option<DownloadMetadata> {
        self.tasks
            .get(task_id)
            .and_then(|entry| entry.result.clone())
    }

    fn cleanup_before(&self, cutoff: DateTime<Utc>) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|_, entry| {
            let last_active = entry
                .task
                .snapshot()
                .last_active_at
                .unwrap_or(entry.registered_at);
            last_active >= cutoff
        });
        let removed = before.saturating_sub(self.tasks.len());
        if removed > 0 {
            tracing::debug!(removed, "Stale tasks cleaned up");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::playlist::PlaylistStats;
    use crate::domain::voice::AudioFormat;
    use chrono::Duration;

    fn metadata(guid: &str) -> DownloadMetadata {
        DownloadMetadata {
            content_type: "audio/mp3".to_string(),
            filename: "an1_pli+en_Amy.mp3".to_string(),
            guid: guid.to_string(),
            volume: "an_en_sujato_amy".to_string(),
            format: AudioFormat::Mp3,
            stats: PlaylistStats::default(),
            build_timestamp: Utc::now(),
            error: None,
        }
    }

    #[test]
    fn test_task_lifecycle() {
        let manager = InMemoryTaskManager::new();
        let task = Arc::new(ProgressTask::new("download an1"));
        let task_id = task.id().to_string();

        manager.register(task.clone()).unwrap();
        assert!(matches!(
            manager.register(task),
            Err(TaskError::AlreadyExists(_))
        ));
        assert!(manager.get_task(&task_id).is_some());
        assert!(manager.get_result(&task_id).is_none());

        manager.complete(&task_id, metadata("abc")).unwrap();
        assert_eq!(manager.get_result(&task_id).unwrap().guid, "abc");

        assert!(matches!(
            manager.complete("missing", metadata("abc")),
            Err(TaskError::NotFound(_))
        ));
    }

    #[test]
    fn test_cleanup_before() {
        let manager = InMemoryTaskManager::new();
        let task = Arc::new(ProgressTask::new("old"));
        task.start("old");
        manager.register(task).unwrap();

        assert_eq!(manager.cleanup_before(Utc::now() - Duration::hours(1)), 0);
        assert_eq!(manager.cleanup_before(Utc::now() + Duration::seconds(1)), 1);
        assert!(manager.is_empty());
    }
}
