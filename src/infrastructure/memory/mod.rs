//! Memory Layer - In-Memory State Management
//!
//! 实现 TaskManager，管理下载构建任务的内存状态

mod task_manager;

pub use task_manager::InMemoryTaskManager;
