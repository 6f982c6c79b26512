//! Generation service abstraction.
//!
//! The external service turns a topic into a story structure and each scene
//! prompt into a finished image. Implementations are expected to classify
//! credential rejections as [`GenerationError::Authorization`].

use async_trait::async_trait;

use crate::error::GenerationError;
use crate::story::{RenderSettings, StoryResult, TitleData};

/// Contract for the external prompt→structure and prompt→image calls.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Converts a topic into ordered scene drafts plus narrative metadata.
    /// The service enforces bounds on `scene_count`.
    async fn generate_story_structure(
        &self,
        topic: &str,
        reference_image: Option<&str>,
        scene_count: u32,
    ) -> Result<StoryResult, GenerationError>;

    /// Renders one scene prompt and returns a reference to the finished image.
    async fn generate_scene_image(
        &self,
        settings: &RenderSettings,
        image_prompt: &str,
        reference_image: Option<&str>,
    ) -> Result<String, GenerationError>;

    /// Produces fresh title candidates for a topic.
    async fn generate_titles(&self, topic: &str) -> Result<Vec<TitleData>, GenerationError>;
}
