//! Ephemeral Sweeper - 后台定时清理临时缓存条目

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::application::ports::AudioCachePort;

/// 临时条目清理任务
///
/// 与缓存句柄同生命周期：shutdown 或 drop 时停止
pub struct EphemeralSweeper {
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl EphemeralSweeper {
    /// 在当前 tokio runtime 上启动清理任务
    pub fn spawn(cache: Arc<dyn AudioCachePort>, interval: Duration) -> Self {
        let token = CancellationToken::new();
        let cancelled = token.clone();

        let handle = tokio::spawn(async move {
            tracing::info!(interval_ms = interval.as_millis() as u64, "Ephemeral sweeper started");

            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // 第一次 tick 立即返回
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {
                        if let Err(e) = cache.clear_ephemerals(None).await {
                            tracing::warn!(error = %e, "Ephemeral sweep failed");
                        }
                    }
                }
            }

            tracing::info!("Ephemeral sweeper stopped");
        });

        Self {
            token,
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// 停止并等待清理任务结束
    pub async fn shutdown(mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "Ephemeral sweeper task failed");
            }
        }
    }
}

impl Drop for EphemeralSweeper {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
