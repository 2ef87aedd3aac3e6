//! Download Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::TaskManagerPort;
use crate::application::queries::download_queries::{DownloadStatusQuery, DownloadStatusResponse};

/// DownloadStatus Handler - 查询构建进度
pub struct DownloadStatusHandler {
    task_manager: Arc<dyn TaskManagerPort>,
}

impl DownloadStatusHandler {
    pub fn new(task_manager: Arc<dyn TaskManagerPort>) -> Self {
        Self { task_manager }
    }

    pub fn handle(
        &self,
        query: DownloadStatusQuery,
    ) -> Result<DownloadStatusResponse, ApplicationError> {
        let task = self
            .task_manager
            .get_task(&query.task_id)
            .ok_or_else(|| ApplicationError::not_found("Task", query.task_id.clone()))?;

        Ok(DownloadStatusResponse {
            task: task.snapshot(),
            result: self.task_manager.get_result(&query.task_id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ProgressTask, TaskState};
    use crate::infrastructure::memory::InMemoryTaskManager;

    #[test]
    fn test_status_of_running_task() {
        let tasks = InMemoryTaskManager::new().arc();
        let task = Arc::new(ProgressTask::new("download mn1"));
        task.start("Building mn1");
        task.set_total(4);
        task.advance();
        tasks.register(task.clone()).unwrap();

        let handler = DownloadStatusHandler::new(tasks);
        let response = handler
            .handle(DownloadStatusQuery {
                task_id: task.id().to_string(),
            })
            .unwrap();
        assert_eq!(response.task.state, TaskState::Running);
        assert_eq!(response.task.actions_done, 1);
        assert_eq!(response.task.actions_total, 4);
        assert!(response.result.is_none());

        let missing = handler.handle(DownloadStatusQuery {
            task_id: "nope".to_string(),
        });
        assert!(matches!(missing, Err(ApplicationError::NotFound { .. })));
    }
}
