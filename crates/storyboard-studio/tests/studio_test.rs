//! Integration tests for the studio composition root.

mod common;

use std::sync::Arc;

use storyboard_scenes::StoryboardOutcome;
use storyboard_test_support::RecordingSurface;

use common::{config_at, open_studio, settled, temp_data_dir, three_scene_service};

#[tokio::test]
async fn test_environment_key_storyboard_is_rendered_and_persisted() {
    // Arrange
    let data_dir = temp_data_dir();
    let service = three_scene_service();
    let surface = Arc::new(RecordingSurface::new());
    let studio = open_studio(config_at(data_dir.clone(), Some("AIza-env")), &service, &surface).await;

    // Act
    let outcome = studio.generate("sunset").await;
    let board = settled(&studio).await;
    studio.shutdown().await;

    // Assert
    assert!(matches!(
        outcome,
        StoryboardOutcome::Launched { scene_count: 3, .. }
    ));
    assert!(board.scenes().iter().all(|s| s.image_url().is_some()));
    assert_eq!(surface.open_count(), 0);

    let raw = tokio::fs::read_to_string(data_dir.join("wt_history.json"))
        .await
        .unwrap();
    let items: Vec<serde_json::Value> = serde_json::from_str(&raw).unwrap();
    assert_eq!(items.len(), 3);
    assert!(items.iter().all(|item| item["type"] == "image"));
    assert!(items.iter().all(|item| item["timestamp"].is_i64()));
    assert!(
        items
            .iter()
            .all(|item| item["id"].as_str().is_some_and(|id| id.len() == 9))
    );
}

#[tokio::test]
async fn test_history_survives_reopening_the_studio() {
    // Arrange
    let data_dir = temp_data_dir();
    let service = three_scene_service();
    let surface = Arc::new(RecordingSurface::new());
    let studio = open_studio(config_at(data_dir.clone(), Some("AIza-env")), &service, &surface).await;
    studio.generate("sunset").await;
    settled(&studio).await;
    studio.shutdown().await;
    let ids = |items: Vec<storyboard_history::HistoryItem>| -> Vec<String> {
        items.into_iter().map(|item| item.id).collect()
    };
    let before = ids(studio.history().items());

    // Act
    let reopened = open_studio(config_at(data_dir, Some("AIza-env")), &service, &surface).await;

    // Assert
    assert_eq!(before.len(), 3);
    assert_eq!(ids(reopened.history().items()), before);
}

#[tokio::test]
async fn test_corrupt_history_file_starts_empty() {
    let data_dir = temp_data_dir();
    tokio::fs::create_dir_all(&data_dir).await.unwrap();
    tokio::fs::write(data_dir.join("wt_history.json"), "{not json")
        .await
        .unwrap();
    let service = three_scene_service();
    let surface = Arc::new(RecordingSurface::new());

    let studio = open_studio(config_at(data_dir, Some("AIza-env")), &service, &surface).await;

    assert!(studio.history().is_empty());
}

#[tokio::test]
async fn test_missing_credential_blocks_generation_until_a_key_is_applied() {
    // Arrange
    let data_dir = temp_data_dir();
    let service = three_scene_service();
    let surface = Arc::new(RecordingSurface::new());
    let studio = open_studio(config_at(data_dir.clone(), None), &service, &surface).await;

    // Act
    let blocked = studio.generate("sunset").await;
    let active = studio.gate().apply_key("AIza-manual").await.unwrap();
    let launched = studio.generate("sunset").await;
    settled(&studio).await;

    // Assert
    assert_eq!(blocked, StoryboardOutcome::CredentialRequired);
    assert!(active);
    assert!(matches!(launched, StoryboardOutcome::Launched { .. }));
    assert_eq!(surface.open_count(), 1);
    assert_eq!(surface.close_count(), 1);
    assert_eq!(service.structure_calls(), ["sunset"]);

    let reopened = open_studio(config_at(data_dir, None), &service, &surface).await;
    assert!(reopened.gate().is_active());
}

#[tokio::test]
async fn test_reset_credentials_removes_stored_key() {
    let data_dir = temp_data_dir();
    let service = three_scene_service();
    let surface = Arc::new(RecordingSurface::new());
    let studio = open_studio(config_at(data_dir.clone(), None), &service, &surface).await;
    studio.gate().apply_key("AIza-manual").await.unwrap();

    let active = studio.gate().reset_credentials().await.unwrap();

    assert!(!active);
    assert!(!data_dir.join("wt_api_key.json").exists());
}
