//! Commands for the Scene Generation context.

use storyboard_core::command::Command;
use uuid::Uuid;

/// Command to generate a whole storyboard from a topic.
#[derive(Debug, Clone)]
pub struct GenerateStoryboard {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// What the story is about. Blank topics are ignored.
    pub topic: String,
    /// Optional reference image guiding structure and renders.
    pub reference_image: Option<String>,
    /// Requested number of scenes; bounds are enforced by the service.
    pub scene_count: u32,
}

impl GenerateStoryboard {
    /// Creates the command with a fresh correlation ID and no reference image.
    #[must_use]
    pub fn new(topic: impl Into<String>, scene_count: u32) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            topic: topic.into(),
            reference_image: None,
            scene_count,
        }
    }

    /// Attaches a reference image.
    #[must_use]
    pub fn with_reference_image(mut self, reference_image: impl Into<String>) -> Self {
        self.reference_image = Some(reference_image.into());
        self
    }
}

impl Command for GenerateStoryboard {
    fn command_type(&self) -> &'static str {
        "scenes.generate_storyboard"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to re-render one existing slot with a new prompt.
#[derive(Debug, Clone)]
pub struct RegenerateScene {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Slot position.
    pub index: usize,
    /// Replacement image prompt.
    pub prompt: String,
}

impl RegenerateScene {
    /// Creates the command with a fresh correlation ID.
    #[must_use]
    pub fn new(index: usize, prompt: impl Into<String>) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            index,
            prompt: prompt.into(),
        }
    }
}

impl Command for RegenerateScene {
    fn command_type(&self) -> &'static str {
        "scenes.regenerate_scene"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to replace the published titles with fresh candidates.
#[derive(Debug, Clone)]
pub struct RegenerateTitles {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Topic the titles are generated for.
    pub topic: String,
}

impl RegenerateTitles {
    /// Creates the command with a fresh correlation ID.
    #[must_use]
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            topic: topic.into(),
        }
    }
}

impl Command for RegenerateTitles {
    fn command_type(&self) -> &'static str {
        "scenes.regenerate_titles"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
