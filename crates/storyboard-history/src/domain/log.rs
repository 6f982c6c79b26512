//! The bounded history log.

use std::collections::VecDeque;

use super::item::HistoryItem;

/// Default number of items kept before the oldest are dropped.
pub const DEFAULT_CAPACITY: usize = 100;

/// Newest-first sequence of history items, bounded to a fixed capacity.
///
/// Items beyond capacity are dropped, not archived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryLog {
    items: VecDeque<HistoryItem>,
    capacity: usize,
}

impl HistoryLog {
    /// Creates an empty log holding at most `capacity` items.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::new(),
            capacity,
        }
    }

    /// Rebuilds a log from its persisted JSON form, keeping the first
    /// `capacity` items.
    ///
    /// # Errors
    ///
    /// Returns the decoder error if `json` is not a list of history items.
    pub fn from_json(json: &str, capacity: usize) -> Result<Self, serde_json::Error> {
        let mut items: VecDeque<HistoryItem> = serde_json::from_str(json)?;
        items.truncate(capacity);
        Ok(Self { items, capacity })
    }

    /// Serializes the log, newest first.
    ///
    /// # Errors
    ///
    /// Returns the encoder error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.items)
    }

    /// Prepends `item`, dropping the oldest items beyond capacity.
    pub fn append(&mut self, item: HistoryItem) {
        self.items.push_front(item);
        self.items.truncate(self.capacity);
    }

    /// Removes every item.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Looks up one item by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&HistoryItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Iterates newest first.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryItem> {
        self.items.iter()
    }

    /// Number of items held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Maximum number of items held.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
