//! Debounced persistence.
//!
//! Every change cancels the pending write and schedules a new one after the
//! quiet interval, so a burst of changes collapses into one write of the
//! final state.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use storyboard_core::storage::KeyValueStore;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Owns the cancelable pending-write handle for one storage key.
pub struct DebouncedWriter {
    storage: Arc<dyn KeyValueStore>,
    key: String,
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl DebouncedWriter {
    /// Creates a writer for `key` with the given quiet interval.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>, key: impl Into<String>, delay: Duration) -> Self {
        Self {
            storage,
            key: key.into(),
            delay,
            pending: Mutex::new(None),
        }
    }

    /// Cancels any pending write and schedules `payload` to be written once
    /// the quiet interval elapses.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn schedule(&self, payload: String) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.take() {
            previous.abort();
        }

        let storage = Arc::clone(&self.storage);
        let key = self.key.clone();
        let delay = self.delay;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            write(storage.as_ref(), &key, payload).await;
        }));
    }

    /// Cancels any pending write and writes `payload` immediately.
    pub async fn flush(&self, payload: String) {
        self.cancel();
        write(self.storage.as_ref(), &self.key, payload).await;
    }

    /// Cancels the pending write, if any.
    pub fn cancel(&self) {
        let previous = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Whether a write is scheduled and has not yet completed.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl std::fmt::Debug for DebouncedWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebouncedWriter")
            .field("key", &self.key)
            .field("delay", &self.delay)
            .field("pending", &self.is_pending())
            .finish_non_exhaustive()
    }
}

async fn write(storage: &dyn KeyValueStore, key: &str, payload: String) {
    let bytes = payload.len();
    match storage.set(key, payload).await {
        Ok(()) => debug!(key, bytes, "persisted"),
        Err(e) => error!(key, error = %e, "persist failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyboard_test_support::{FailingStore, MemoryStore};

    fn writer(storage: &Arc<MemoryStore>) -> DebouncedWriter {
        DebouncedWriter::new(
            Arc::clone(storage) as Arc<dyn KeyValueStore>,
            "k",
            Duration::from_millis(500),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_waits_for_quiet_interval() {
        let storage = Arc::new(MemoryStore::new());
        let writer = writer(&storage);

        writer.schedule("one".to_owned());
        tokio::time::sleep(Duration::from_millis(499)).await;
        assert!(storage.writes().is_empty());
        assert!(writer.is_pending());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(storage.writes(), [("k".to_owned(), "one".to_owned())]);
        assert!(!writer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_cancels_previous_write() {
        // Arrange
        let storage = Arc::new(MemoryStore::new());
        let writer = writer(&storage);

        // Act
        writer.schedule("first".to_owned());
        tokio::time::sleep(Duration::from_millis(300)).await;
        writer.schedule("second".to_owned());
        tokio::time::sleep(Duration::from_millis(300)).await;

        // Assert: the first timer would have fired at 500ms.
        assert!(storage.writes().is_empty());
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(storage.writes(), [("k".to_owned(), "second".to_owned())]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_writes_now_and_drops_pending_write() {
        let storage = Arc::new(MemoryStore::new());
        let writer = writer(&storage);

        writer.schedule("stale".to_owned());
        writer.flush("final".to_owned()).await;
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(storage.writes(), [("k".to_owned(), "final".to_owned())]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_write_is_logged_not_raised() {
        let writer = DebouncedWriter::new(Arc::new(FailingStore), "k", Duration::from_millis(500));

        writer.schedule("payload".to_owned());
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(!writer.is_pending());
    }
}
