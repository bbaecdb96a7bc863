//! Watcher task handle
//!
//! The change watcher's lifetime is the process lifetime, and it is never
//! joined before a scale-triggered exit (its loop is unbounded, so a
//! join-before-exit would block forever). The handle is retained anyway so an
//! embedding system can cancel the task during an orderly non-elastic
//! teardown.

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Handle to the spawned change watcher task
pub struct WatcherHandle {
    join: JoinHandle<()>,
    shutdown: broadcast::Sender<()>,
}

impl WatcherHandle {
    pub(crate) fn new(join: JoinHandle<()>, shutdown: broadcast::Sender<()>) -> Self {
        Self { join, shutdown }
    }

    /// Ask the watcher to stop at its next suspension point
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(());
    }

    /// Abort the task outright
    pub fn abort(&self) {
        self.join.abort();
    }

    /// True once the watcher task has ended
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the task to end. Only meaningful after [`shutdown`] or a
    /// scale event; the watch loop itself never returns.
    ///
    /// [`shutdown`]: WatcherHandle::shutdown
    pub async fn join(self) {
        let _ = self.join.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_shutdown_stops_task() {
        let (tx, mut rx) = broadcast::channel(1);
        let join = tokio::spawn(async move {
            let _ = rx.recv().await;
        });

        let handle = WatcherHandle::new(join, tx);
        assert!(!handle.is_finished());

        handle.shutdown();
        handle.join().await;
    }

    #[tokio::test]
    async fn test_abort_ends_task() {
        let (tx, _rx) = broadcast::channel(1);
        let join = tokio::spawn(async {
            std::future::pending::<()>().await;
        });

        let handle = WatcherHandle::new(join, tx);
        handle.abort();
        handle.join().await;
    }
}
