//! The studio context object.

use std::sync::Arc;

use storyboard_core::clock::SystemClock;
use storyboard_core::credential::CredentialSurface;
use storyboard_core::ids::RandomIds;
use storyboard_core::service::GenerationService;
use storyboard_core::storage::KeyValueStore;
use storyboard_credentials::CredentialGate;
use storyboard_history::HistoryStore;
use storyboard_scenes::{GenerateStoryboard, Orchestrator, StoryboardOutcome};
use tracing::info;

use crate::config::StudioConfig;
use crate::error::StudioError;
use crate::file_store::FileStore;
use crate::vault::StoredCredentialVault;

/// Shared services of one running studio. Hosts hold one `Studio` and pass
/// it, or the handles it exposes, wherever they are needed.
#[derive(Debug, Clone)]
pub struct Studio {
    config: StudioConfig,
    store: FileStore,
    gate: Arc<CredentialGate>,
    orchestrator: Orchestrator,
}

impl Studio {
    /// Opens the data directory, refreshes the credential gate, loads the
    /// history and builds the orchestrator.
    ///
    /// # Errors
    ///
    /// Returns `StudioError::Storage` if the data directory cannot be
    /// created.
    pub async fn open(
        config: StudioConfig,
        service: Arc<dyn GenerationService>,
        surface: Arc<dyn CredentialSurface>,
    ) -> Result<Self, StudioError> {
        let store = FileStore::open(&config.data_dir).await?;
        let shared: Arc<dyn KeyValueStore> = Arc::new(store.clone());

        let vault = StoredCredentialVault::new(Arc::clone(&shared), config.api_key.is_some());
        let gate = Arc::new(CredentialGate::new(Arc::new(vault), surface));
        let active = gate.refresh().await;

        let history = HistoryStore::load(
            config.history_config(),
            shared,
            Arc::new(SystemClock),
            Arc::new(RandomIds),
        )
        .await;

        let orchestrator = Orchestrator::new(
            service,
            Arc::clone(&gate),
            history,
            config.render_settings,
        );

        info!(
            data_dir = %config.data_dir.display(),
            credential_active = active,
            history_items = orchestrator.history().len(),
            "studio opened"
        );

        Ok(Self {
            config,
            store,
            gate,
            orchestrator,
        })
    }

    /// Starts a storyboard for `topic` with the configured scene count and
    /// the current reference image.
    pub async fn generate(&self, topic: &str) -> StoryboardOutcome {
        let mut command = GenerateStoryboard::new(topic, self.config.scene_count);
        command.reference_image = self.orchestrator.reference_image();
        self.orchestrator.generate_storyboard(&command).await
    }

    /// Persists pending history immediately.
    pub async fn shutdown(&self) {
        self.orchestrator.history().flush().await;
        info!("studio shut down");
    }

    /// Configuration the studio was opened with.
    #[must_use]
    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    /// The file-backed store.
    #[must_use]
    pub fn store(&self) -> &FileStore {
        &self.store
    }

    /// The credential gate.
    #[must_use]
    pub fn gate(&self) -> &Arc<CredentialGate> {
        &self.gate
    }

    /// The orchestrator.
    #[must_use]
    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// The history store.
    #[must_use]
    pub fn history(&self) -> &HistoryStore {
        self.orchestrator.history()
    }
}
