//! Progress Task
//!
//! 长时间运行操作的进度记录，可在多个 worker 间共享

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Pending,
    Running,
    Done,
    Failed,
}

impl TaskState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::Pending => "pending",
            TaskState::Running => "running",
            TaskState::Done => "done",
            TaskState::Failed => "failed",
        }
    }
}

/// 进度快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSnapshot {
    pub id: String,
    pub name: String,
    pub state: TaskState,
    pub summary: String,
    pub actions_total: u64,
    pub actions_done: u64,
    pub done: bool,
    pub error: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub last_active_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct TaskDetail {
    summary: String,
    error: Option<String>,
    started_at: Option<DateTime<Utc>>,
    last_active_at: Option<DateTime<Utc>>,
}

/// 进度任务
///
/// 不变量:
/// - 0 <= actions_done <= actions_total
/// - 失败后不再推进
#[derive(Debug)]
pub struct ProgressTask {
    id: String,
    name: String,
    actions_total: AtomicU64,
    actions_done: AtomicU64,
    detail: RwLock<TaskDetail>,
}

impl ProgressTask {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            actions_total: AtomicU64::new(0),
            actions_done: AtomicU64::new(0),
            detail: RwLock::new(TaskDetail::default()),
        }
    }

    /// 开始任务，重置进度
    pub fn start(&self, summary: impl Into<String>) {
        let mut detail = self.detail.write();
        let now = Utc::now();
        self.actions_done.store(0, Ordering::SeqCst);
        self.actions_total.store(0, Ordering::SeqCst);
        detail.summary = summary.into();
        detail.error = None;
        detail.started_at = Some(now);
        detail.last_active_at = Some(now);
    }

    /// 设置总步数，不小于已完成步数
    pub fn set_total(&self, total: u64) {
        let _guard = self.detail.read();
        let done = self.actions_done.load(Ordering::SeqCst);
        self.actions_total.store(total.max(done), Ordering::SeqCst);
    }

    /// 推进一步，返回推进后的完成步数
    ///
    /// 已失败或已达总数时不推进
    pub fn advance(&self) -> u64 {
        let mut detail = self.detail.write();
        if detail.error.is_some() {
            return self.actions_done.load(Ordering::SeqCst);
        }
        let total = self.actions_total.load(Ordering::SeqCst);
        let done = match self
            .actions_done
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |done| {
                (done < total).then_some(done + 1)
            }) {
            Ok(previous) => previous + 1,
            Err(current) => current,
        };
        detail.last_active_at = Some(Utc::now());
        done
    }

    /// 记录失败，仅第一次生效
    pub fn fail(&self, error: impl Into<String>) -> bool {
        let mut detail = self.detail.write();
        if detail.error.is_some() {
            return false;
        }
        let error = error.into();
        detail.summary = format!("Error: {error}");
        detail.error = Some(error);
        detail.last_active_at = Some(Utc::now());
        true
    }

    pub fn set_summary(&self, summary: impl Into<String>) {
        let mut detail = self.detail.write();
        if detail.error.is_none() {
            detail.summary = summary.into();
        }
        detail.last_active_at = Some(Utc::now());
    }

    pub fn summary(&self) -> String {
        self.detail.read().summary.clone()
    }

    pub fn state(&self) -> TaskState {
        let detail = self.detail.read();
        if detail.error.is_some() {
            return TaskState::Failed;
        }
        if detail.started_at.is_none() {
            return TaskState::Pending;
        }
        let total = self.actions_total.load(Ordering::SeqCst);
        let done = self.actions_done.load(Ordering::SeqCst);
        if total > 0 && done >= total {
            TaskState::Done
        } else {
            TaskState::Running
        }
    }

    pub fn is_done(&self) -> bool {
        self.state() == TaskState::Done
    }

    pub fn error(&self) -> Option<String> {
        self.detail.read().error.clone()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn actions_total(&self) -> u64 {
        self.actions_total.load(Ordering::SeqCst)
    }

    pub fn actions_done(&self) -> u64 {
        self.actions_done.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> TaskSnapshot {
        let state = self.state();
        let detail = self.detail.read();
        TaskSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            state,
            summary: detail.summary.clone(),
            actions_total: self.actions_total(),
            actions_done: self.actions_done(),
            done: state == TaskState::Done,
            error: detail.error.clone(),
            started_at: detail.started_at,
            last_active_at: detail.last_active_at,
        }
    }
}
