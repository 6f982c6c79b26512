//! Storyboard generator — History context.
//!
//! Responsible for the newest-first, capacity-bounded log of every artifact
//! the generator renders, and for persisting it to durable local storage with
//! debounced writes.

pub mod application;
pub mod domain;

pub use application::store::{HistoryConfig, HistoryStore};
pub use domain::item::{HistoryItem, MediaType};
pub use domain::log::{DEFAULT_CAPACITY, HistoryLog};
