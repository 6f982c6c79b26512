//! Scene slots.

use std::fmt;

use serde::Serialize;

/// Failure marker shown on a slot whose render failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SlotError {
    /// The initial render failed.
    #[serde(rename = "Render Error")]
    RenderFailed,
    /// A user-triggered re-render failed.
    #[serde(rename = "Retry Failed")]
    RetryFailed,
}

impl fmt::Display for SlotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::RenderFailed => "Render Error",
            Self::RetryFailed => "Retry Failed",
        })
    }
}

/// Borrowed view of which of the three slot states holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneState<'a> {
    /// A render task is outstanding.
    Loading,
    /// The render finished with this artifact reference.
    Rendered(&'a str),
    /// The render failed.
    Failed(SlotError),
}

/// One positional entry of the storyboard.
///
/// Exactly one of loading, rendered, or failed holds. The constructors below
/// are the only way to change state, so the invariant cannot be broken from
/// outside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    index: usize,
    image_prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<String>,
    is_loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<SlotError>,
}

impl Scene {
    /// A freshly drafted slot awaiting its first render.
    #[must_use]
    pub fn loading(index: usize, image_prompt: String, description: Option<String>) -> Self {
        Self {
            index,
            image_prompt,
            description,
            image_url: None,
            is_loading: true,
            error: None,
        }
    }

    /// This slot with its render finished.
    #[must_use]
    pub fn rendered(&self, image_url: String) -> Self {
        Self {
            image_url: Some(image_url),
            is_loading: false,
            error: None,
            ..self.clone()
        }
    }

    /// This slot with its render failed.
    #[must_use]
    pub fn failed(&self, error: SlotError) -> Self {
        Self {
            image_url: None,
            is_loading: false,
            error: Some(error),
            ..self.clone()
        }
    }

    /// This slot reset for a re-render with `image_prompt`; any prior image
    /// or error is cleared.
    #[must_use]
    pub fn requeued(&self, image_prompt: String) -> Self {
        Self {
            image_prompt,
            image_url: None,
            is_loading: true,
            error: None,
            ..self.clone()
        }
    }

    /// Position in the storyboard.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Prompt the image is rendered from.
    #[must_use]
    pub fn image_prompt(&self) -> &str {
        &self.image_prompt
    }

    /// Narrative description, if the structure call supplied one.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Rendered artifact reference.
    #[must_use]
    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    /// Whether a render task is outstanding.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Failure marker.
    #[must_use]
    pub fn error(&self) -> Option<SlotError> {
        self.error
    }

    /// Which state the slot is in.
    #[must_use]
    pub fn state(&self) -> SceneState<'_> {
        match (&self.image_url, self.error) {
            (Some(url), _) => SceneState::Rendered(url),
            (None, Some(error)) => SceneState::Failed(error),
            (None, None) => SceneState::Loading,
        }
    }
}
