//! Shared test doubles for the storyboard generator.

mod clock;
mod credential;
mod generation;
mod ids;
mod storage;

pub use clock::{FixedClock, SteppingClock};
pub use credential::{MemoryVault, RecordingSurface};
pub use generation::{ImageRelease, ScriptedGenerationService, story_with_prompts};
pub use ids::SequenceIds;
pub use storage::{FailingStore, MemoryStore};
