//! The History Store: shared handle over the bounded log.

use std::sync::Arc;
use std::time::Duration;

use storyboard_core::clock::Clock;
use storyboard_core::error::StorageError;
use storyboard_core::ids::IdGenerator;
use storyboard_core::storage::KeyValueStore;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::persistence::DebouncedWriter;
use crate::domain::item::{HistoryItem, MediaType};
use crate::domain::log::{DEFAULT_CAPACITY, HistoryLog};

/// Storage key the history is persisted under.
pub const HISTORY_KEY: &str = "wt_history";

/// Default persistence quiet interval.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Tunables for the History Store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Maximum number of items kept.
    pub capacity: usize,
    /// Quiet interval before a change is persisted.
    pub debounce: Duration,
    /// Storage key.
    pub storage_key: String,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            debounce: DEFAULT_DEBOUNCE,
            storage_key: HISTORY_KEY.to_owned(),
        }
    }
}

struct Inner {
    log: watch::Sender<HistoryLog>,
    writer: DebouncedWriter,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

/// Cloneable handle to the History Store.
///
/// Every mutation goes through the single `watch` sender, so concurrent
/// render tasks always append to the latest log, and every mutation
/// reschedules the debounced write.
#[derive(Clone)]
pub struct HistoryStore {
    inner: Arc<Inner>,
}

impl HistoryStore {
    /// Loads persisted history and returns a store over it.
    ///
    /// Missing history starts empty. Unreadable or corrupt stored data is
    /// logged and treated as no prior history.
    pub async fn load(
        config: HistoryConfig,
        storage: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        let log = match read_log(storage.as_ref(), &config.storage_key, config.capacity).await {
            Ok(log) => {
                info!(items = log.len(), "history loaded");
                log
            }
            Err(e @ StorageError::Corrupt { .. }) => {
                warn!(error = %e, "stored history is corrupt; starting empty");
                HistoryLog::new(config.capacity)
            }
            Err(e) => {
                warn!(key = %config.storage_key, error = %e, "failed to read stored history; starting empty");
                HistoryLog::new(config.capacity)
            }
        };

        let writer = DebouncedWriter::new(storage, config.storage_key, config.debounce);
        Self {
            inner: Arc::new(Inner {
                log: watch::Sender::new(log),
                writer,
                clock,
                ids,
            }),
        }
    }

    /// Creates an item for a freshly rendered artifact and appends it.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn record(
        &self,
        url: impl Into<String>,
        media_type: MediaType,
        prompt: impl Into<String>,
    ) -> HistoryItem {
        let item = HistoryItem {
            id: self.inner.ids.next_id(),
            url: url.into(),
            media_type,
            prompt: prompt.into(),
            timestamp: self.inner.clock.now(),
        };
        self.append(item.clone());
        item
    }

    /// Prepends `item`, truncating to capacity.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn append(&self, item: HistoryItem) {
        debug!(id = %item.id, "history append");
        self.inner.log.send_modify(|log| log.append(item));
        self.schedule_persist();
    }

    /// Removes every item.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn clear(&self) {
        info!("history cleared");
        self.inner.log.send_modify(HistoryLog::clear);
        self.schedule_persist();
    }

    /// Selects one item by id for detail display.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<HistoryItem> {
        self.inner.log.borrow().get(id).cloned()
    }

    /// Snapshot of all items, newest first.
    #[must_use]
    pub fn items(&self) -> Vec<HistoryItem> {
        self.inner.log.borrow().iter().cloned().collect()
    }

    /// Number of items held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.log.borrow().len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.log.borrow().is_empty()
    }

    /// Subscribes to log changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<HistoryLog> {
        self.inner.log.subscribe()
    }

    /// Writes the current state immediately, dropping any pending write.
    pub async fn flush(&self) {
        let Some(payload) = self.serialize() else {
            return;
        };
        self.inner.writer.flush(payload).await;
    }

    fn schedule_persist(&self) {
        if let Some(payload) = self.serialize() {
            self.inner.writer.schedule(payload);
        }
    }

    fn serialize(&self) -> Option<String> {
        match self.inner.log.borrow().to_json() {
            Ok(json) => Some(json),
            Err(e) => {
                warn!(error = %e, "failed to serialize history");
                None
            }
        }
    }
}

async fn read_log(
    storage: &dyn KeyValueStore,
    key: &str,
    capacity: usize,
) -> Result<HistoryLog, StorageError> {
    let Some(json) = storage.get(key).await? else {
        return Ok(HistoryLog::new(capacity));
    };
    HistoryLog::from_json(&json, capacity).map_err(|e| StorageError::Corrupt {
        key: key.to_owned(),
        reason: e.to_string(),
    })
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore")
            .field("len", &self.len())
            .field("writer", &self.inner.writer)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use storyboard_test_support::{FailingStore, MemoryStore, SequenceIds, SteppingClock};

    async fn store_over(storage: Arc<dyn KeyValueStore>) -> HistoryStore {
        let clock = SteppingClock::new(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap());
        HistoryStore::load(
            HistoryConfig::default(),
            storage,
            Arc::new(clock),
            Arc::new(SequenceIds::new()),
        )
        .await
    }

    fn stored_ids(storage: &MemoryStore) -> Vec<String> {
        let json = storage.value(HISTORY_KEY).unwrap();
        HistoryLog::from_json(&json, DEFAULT_CAPACITY)
            .unwrap()
            .iter()
            .map(|item| item.id.clone())
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_of_appends_produces_one_write_of_final_state() {
        // Arrange
        let storage = Arc::new(MemoryStore::new());
        let store = store_over(storage.clone()).await;

        // Act
        for n in 0..5 {
            store.record(format!("image://{n}"), MediaType::Image, format!("prompt {n}"));
        }
        tokio::time::sleep(Duration::from_millis(600)).await;

        // Assert
        assert_eq!(storage.writes().len(), 1);
        assert_eq!(
            stored_ids(&storage),
            ["item-5", "item-4", "item-3", "item-2", "item-1"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_appends_spread_beyond_interval_write_separately() {
        let storage = Arc::new(MemoryStore::new());
        let store = store_over(storage.clone()).await;

        store.record("image://a", MediaType::Image, "a");
        tokio::time::sleep(Duration::from_millis(600)).await;
        store.record("image://b", MediaType::Image, "b");
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(storage.writes().len(), 2);
        assert_eq!(stored_ids(&storage), ["item-2", "item-1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_record_stamps_id_and_time() {
        let store = store_over(Arc::new(MemoryStore::new())).await;

        let first = store.record("image://a", MediaType::Image, "a");
        let second = store.record("image://b", MediaType::Image, "b");

        assert_eq!(first.id, "item-1");
        assert_eq!(
            first.timestamp,
            Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
        );
        assert!(second.timestamp > first.timestamp);
        assert_eq!(store.items(), vec![second, first]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_restores_persisted_history() {
        // Arrange
        let storage = Arc::new(MemoryStore::new());
        let original = store_over(storage.clone()).await;
        original.record("image://a", MediaType::Image, "a");
        original.record("image://b", MediaType::Image, "b");
        original.flush().await;

        // Act
        let reloaded = store_over(storage.clone()).await;

        // Assert
        assert_eq!(reloaded.items(), original.items());
    }

    #[tokio::test(start_paused = true)]
    async fn test_corrupt_stored_history_loads_as_empty() {
        let storage = Arc::new(MemoryStore::with_value(HISTORY_KEY, "[{\"id\": tru"));

        let store = store_over(storage.clone()).await;

        assert!(store.is_empty());
        assert!(storage.writes().is_empty());
    }

    #[tokio::test]
    async fn test_undecodable_history_is_reported_as_corrupt() {
        let storage = MemoryStore::with_value(HISTORY_KEY, "{\"not\": \"a list\"}");

        let result = read_log(&storage, HISTORY_KEY, DEFAULT_CAPACITY).await;

        assert!(matches!(
            result,
            Err(StorageError::Corrupt { ref key, .. }) if key == HISTORY_KEY
        ));
    }

    #[tokio::test]
    async fn test_missing_history_reads_as_empty_log() {
        let storage = MemoryStore::new();

        let log = read_log(&storage, HISTORY_KEY, 5).await.unwrap();

        assert!(log.is_empty());
        assert_eq!(log.capacity(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreadable_storage_loads_as_empty() {
        let store = store_over(Arc::new(FailingStore)).await;

        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_persists_empty_history() {
        let storage = Arc::new(MemoryStore::new());
        let store = store_over(storage.clone()).await;
        store.record("image://a", MediaType::Image, "a");

        store.clear();
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert!(store.is_empty());
        assert_eq!(storage.writes().len(), 1);
        assert_eq!(storage.value(HISTORY_KEY).as_deref(), Some("[]"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_selects_item_without_mutating() {
        let store = store_over(Arc::new(MemoryStore::new())).await;
        let item = store.record("image://a", MediaType::Image, "a");

        assert_eq!(store.get(&item.id), Some(item));
        assert_eq!(store.get("missing"), None);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_appends() {
        let store = store_over(Arc::new(MemoryStore::new())).await;
        let mut rx = store.subscribe();

        store.record("image://a", MediaType::Image, "a");

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 1);
    }
}
