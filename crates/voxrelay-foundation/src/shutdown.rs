use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// An eventually-observed stop flag shared across every pipeline stage.
///
/// Stages poll `is_stopping()` at their suspension points (queue pop/push,
/// device read/write) rather than being torn down from the outside.
#[derive(Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl Default for ShutdownHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownHandle {
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            notify: Arc::new(Notify::new()),
        }
    }

    pub fn signal(&self) {
        self.flag.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_stopping(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Resolves immediately if already stopping, otherwise waits for `signal()`.
    pub async fn wait(&self) {
        if self.is_stopping() {
            return;
        }
        self.notify.notified().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn wait_resolves_after_signal() {
        let handle = ShutdownHandle::new();
        assert!(!handle.is_stopping());
        let waiter = handle.clone();
        let task = tokio::spawn(async move {
            waiter.wait().await;
        });
        handle.signal();
        task.await.unwrap();
        assert!(handle.is_stopping());
    }

    #[tokio::test]
    async fn wait_returns_immediately_if_already_stopped() {
        let handle = ShutdownHandle::new();
        handle.signal();
        tokio::time::timeout(std::time::Duration::from_millis(50), handle.wait())
            .await
            .expect("wait should not block once already stopping");
    }
}
