//! Test ids — deterministic `IdGenerator` implementation for tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use storyboard_core::ids::IdGenerator;

/// Produces `item-1`, `item-2`, ... in call order.
#[derive(Debug, Default)]
pub struct SequenceIds {
    counter: AtomicUsize,
}

impl SequenceIds {
    /// Create a generator starting at `item-1`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequenceIds {
    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        format!("item-{n}")
    }
}
