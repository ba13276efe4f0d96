//! Shutdown coordinator
//!
//! Holds the cancellation token every long-running task listens to, and
//! tracks the session tasks so shutdown can wait for their teardown.

use std::{
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use tokio::task::JoinHandle;
use tokio_util::{sync::CancellationToken, task::TaskTracker};

#[derive(Debug, Clone)]
pub struct ShutdownCoordinator {
    token: CancellationToken,
    tracker: TaskTracker,
    grace: Duration,
    reported: Arc<AtomicBool>,
}

impl ShutdownCoordinator {
    pub fn new(grace: Duration) -> Self {
        Self {
            token: CancellationToken::new(),
            tracker: TaskTracker::new(),
            grace,
            reported: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 停止を要求する（何度呼んでもよい）
    pub fn trigger(&self) {
        if !self.is_triggered() {
            tracing::info!("Shutdown requested");
        }
        self.token.cancel();
    }

    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// 停止が要求されるまで待つ
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// セッションタスクを追跡対象として起動する
    pub fn spawn<F>(&self, task: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.tracker.spawn(task)
    }

    /// 追跡中のタスク数
    pub fn active_tasks(&self) -> usize {
        self.tracker.len()
    }

    /// 全てのセッションのteardown完了を待つ
    ///
    /// Gives up after the grace period; sessions still running at that point
    /// are abandoned. Returns `true` when every tracked task finished.
    pub async fn drain(&self) -> bool {
        self.trigger();
        self.tracker.close();
        tracing::info!("Waiting for {} sessions to close", self.active_tasks());

        let completed = tokio::time::timeout(self.grace, self.tracker.wait())
            .await
            .is_ok();
        if !completed {
            tracing::warn!(
                "{} sessions did not finish within {:?}, forcing shutdown",
                self.active_tasks(),
                self.grace
            );
        }
        if !self.reported.swap(true, Ordering::SeqCst) {
            tracing::info!("All connections closed");
        }
        completed
    }
}
