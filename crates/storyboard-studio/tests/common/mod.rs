//! Shared test helpers for studio integration tests.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use storyboard_core::credential::CredentialSurface;
use storyboard_core::service::GenerationService;
use storyboard_scenes::{BoardPhase, SceneBoard};
use storyboard_studio::{Studio, StudioConfig};
use storyboard_test_support::{RecordingSurface, ScriptedGenerationService, story_with_prompts};
use uuid::Uuid;

/// A fresh, not yet existing data directory under the system temp dir.
pub fn temp_data_dir() -> PathBuf {
    std::env::temp_dir().join(format!("storyboard-studio-{}", Uuid::new_v4()))
}

/// Configuration rooted at `data_dir`, with three scenes per request.
pub fn config_at(data_dir: PathBuf, api_key: Option<&str>) -> StudioConfig {
    StudioConfig {
        data_dir,
        scene_count: 3,
        api_key: api_key.map(str::to_owned),
        ..StudioConfig::default()
    }
}

/// A service answering every topic with three scenes.
pub fn three_scene_service() -> Arc<ScriptedGenerationService> {
    Arc::new(ScriptedGenerationService::with_story(story_with_prompts(&[
        "dawn", "noon", "dusk",
    ])))
}

/// Opens a studio over `config` with the given doubles.
pub async fn open_studio(
    config: StudioConfig,
    service: &Arc<ScriptedGenerationService>,
    surface: &Arc<RecordingSurface>,
) -> Studio {
    Studio::open(
        config,
        Arc::clone(service) as Arc<dyn GenerationService>,
        Arc::clone(surface) as Arc<dyn CredentialSurface>,
    )
    .await
    .unwrap()
}

/// Waits until every launched render has settled.
pub async fn settled(studio: &Studio) -> SceneBoard {
    let mut rx = studio.orchestrator().subscribe();
    rx.wait_for(|board| board.phase() == BoardPhase::Done)
        .await
        .unwrap()
        .clone()
}
