//! Test generation service — a scripted `GenerationService` for tests.
//!
//! Image results are scripted per prompt and can be held back until the test
//! releases them, so tests decide the order in which render tasks complete.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use storyboard_core::error::GenerationError;
use storyboard_core::service::GenerationService;
use storyboard_core::story::{RenderSettings, SceneDraft, StoryResult, TitleData};
use tokio::sync::Notify;

/// Builds a story whose scenes use the given image prompts, in order.
#[must_use]
pub fn story_with_prompts(prompts: &[&str]) -> StoryResult {
    StoryResult {
        scenes: prompts
            .iter()
            .map(|prompt| SceneDraft {
                image_prompt: (*prompt).to_owned(),
                description: None,
            })
            .collect(),
        titles: vec![TitleData {
            english: "Test Title".to_owned(),
            korean: "테스트 제목".to_owned(),
        }],
        music_prompt: "ambient strings".to_owned(),
        lyrics: "test lyrics".to_owned(),
        lyrics_korean: "테스트 가사".to_owned(),
    }
}

/// Handle that lets a held image call complete.
#[derive(Debug, Clone)]
pub struct ImageRelease(Arc<Notify>);

impl ImageRelease {
    /// Allows the held call to return. Releasing before the call starts is
    /// remembered.
    pub fn release(&self) {
        self.0.notify_one();
    }
}

#[derive(Debug, Clone)]
struct ImageScript {
    result: Result<String, GenerationError>,
    hold: Option<Arc<Notify>>,
}

/// A generation service whose answers are scripted by the test.
///
/// Unscripted image prompts succeed with `image://<prompt>`. Unscripted
/// topics fall back to the default story, if one was given.
#[derive(Debug, Default)]
pub struct ScriptedGenerationService {
    default_story: Mutex<Option<Result<StoryResult, GenerationError>>>,
    stories: Mutex<HashMap<String, Result<StoryResult, GenerationError>>>,
    titles: Mutex<Option<Result<Vec<TitleData>, GenerationError>>>,
    images: Mutex<HashMap<String, ImageScript>>,
    structure_calls: Mutex<Vec<String>>,
    image_calls: Mutex<Vec<String>>,
}

impl ScriptedGenerationService {
    /// Create a service that answers every topic with `story`.
    #[must_use]
    pub fn with_story(story: StoryResult) -> Self {
        let service = Self::default();
        *service.default_story.lock().unwrap() = Some(Ok(story));
        service
    }

    /// Create a service whose structure call always fails with `error`.
    #[must_use]
    pub fn failing_structure(error: GenerationError) -> Self {
        let service = Self::default();
        *service.default_story.lock().unwrap() = Some(Err(error));
        service
    }

    /// Answers `topic` with `story` instead of the default.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn script_story(&self, topic: &str, story: StoryResult) {
        self.stories
            .lock()
            .unwrap()
            .insert(topic.to_owned(), Ok(story));
    }

    /// Answers the title call with `result`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn script_titles(&self, result: Result<Vec<TitleData>, GenerationError>) {
        *self.titles.lock().unwrap() = Some(result);
    }

    /// Answers the image call for `prompt` with `url`.
    pub fn script_image(&self, prompt: &str, url: &str) {
        self.insert_image(prompt, Ok(url.to_owned()), None);
    }

    /// Fails the image call for `prompt` with `error`.
    pub fn script_image_error(&self, prompt: &str, error: GenerationError) {
        self.insert_image(prompt, Err(error), None);
    }

    /// Holds the image call for `prompt` until the returned handle is
    /// released, then answers with `result`.
    pub fn hold_image(
        &self,
        prompt: &str,
        result: Result<String, GenerationError>,
    ) -> ImageRelease {
        let notify = Arc::new(Notify::new());
        self.insert_image(prompt, result, Some(Arc::clone(&notify)));
        ImageRelease(notify)
    }

    /// Topics passed to the structure call, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn structure_calls(&self) -> Vec<String> {
        self.structure_calls.lock().unwrap().clone()
    }

    /// Prompts passed to the image call, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn image_calls(&self) -> Vec<String> {
        self.image_calls.lock().unwrap().clone()
    }

    fn insert_image(
        &self,
        prompt: &str,
        result: Result<String, GenerationError>,
        hold: Option<Arc<Notify>>,
    ) {
        self.images
            .lock()
            .unwrap()
            .insert(prompt.to_owned(), ImageScript { result, hold });
    }
}

#[async_trait]
impl GenerationService for ScriptedGenerationService {
    async fn generate_story_structure(
        &self,
        topic: &str,
        _reference_image: Option<&str>,
        _scene_count: u32,
    ) -> Result<StoryResult, GenerationError> {
        self.structure_calls.lock().unwrap().push(topic.to_owned());
        let scripted = self.stories.lock().unwrap().get(topic).cloned();
        scripted
            .or_else(|| self.default_story.lock().unwrap().clone())
            .unwrap_or_else(|| {
                Err(GenerationError::InvalidResponse(format!(
                    "no story scripted for {topic}"
                )))
            })
    }

    async fn generate_scene_image(
        &self,
        _settings: &RenderSettings,
        image_prompt: &str,
        _reference_image: Option<&str>,
    ) -> Result<String, GenerationError> {
        self.image_calls
            .lock()
            .unwrap()
            .push(image_prompt.to_owned());
        let script = self.images.lock().unwrap().get(image_prompt).cloned();
        let Some(script) = script else {
            return Ok(format!("image://{image_prompt}"));
        };
        if let Some(hold) = script.hold {
            hold.notified().await;
        }
        script.result
    }

    async fn generate_titles(&self, topic: &str) -> Result<Vec<TitleData>, GenerationError> {
        self.titles.lock().unwrap().clone().unwrap_or_else(|| {
            Ok(vec![TitleData {
                english: format!("{topic} (new)"),
                korean: format!("{topic} (새)"),
            }])
        })
    }
}
