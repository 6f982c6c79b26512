//! Storyboard generator — Scene Generation context.
//!
//! Turns a topic into a story structure, then renders every scene
//! concurrently into one shared, ordered board. Also re-renders single scenes
//! and regenerates titles.

pub mod application;
pub mod domain;

pub use application::orchestrator::{
    Orchestrator, RegenerateOutcome, SlotOutcome, StoryboardOutcome, TitlesOutcome,
};
pub use domain::board::{BoardPhase, RenderTicket, SceneBoard};
pub use domain::commands::{GenerateStoryboard, RegenerateScene, RegenerateTitles};
pub use domain::scene::{Scene, SceneState, SlotError};
