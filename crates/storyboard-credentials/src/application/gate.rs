//! The Credential Gate.

use std::sync::Arc;

use storyboard_core::credential::{CredentialSurface, CredentialVault};
use storyboard_core::error::{CredentialError, StorageError};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::domain::state::{Admission, GateState};

/// Owns the process-wide "credential active" flag.
///
/// Only the gate mutates the flag. Callers pass the gate around explicitly;
/// observers subscribe to its state.
pub struct CredentialGate {
    state: watch::Sender<GateState>,
    vault: Arc<dyn CredentialVault>,
    surface: Arc<dyn CredentialSurface>,
}

impl CredentialGate {
    /// Creates an inactive gate. Call [`CredentialGate::refresh`] to pick up
    /// an existing credential.
    #[must_use]
    pub fn new(vault: Arc<dyn CredentialVault>, surface: Arc<dyn CredentialSurface>) -> Self {
        Self {
            state: watch::Sender::new(GateState::default()),
            vault,
            surface,
        }
    }

    /// Whether a usable credential is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state.borrow().is_active()
    }

    /// Subscribes to gate state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<GateState> {
        self.state.subscribe()
    }

    /// Returns `true` if a credential is active. Otherwise starts the
    /// acquisition flow and returns `false`; the caller must not proceed.
    pub fn ensure_active(&self) -> bool {
        let mut admission = Admission::Admitted;
        self.state.send_if_modified(|state| {
            admission = state.admit();
            matches!(admission, Admission::Denied { open_prompt: true })
        });
        match admission {
            Admission::Admitted => true,
            Admission::Denied { open_prompt } => {
                if open_prompt {
                    info!("no active credential; opening credential entry");
                    self.surface.open();
                }
                false
            }
        }
    }

    /// Reacts to the service rejecting the active credential: deactivates it
    /// and starts re-entry. Concurrent calls start a single flow.
    pub async fn mark_failed(&self) {
        let mut was_active = false;
        let mut started = false;
        self.state.send_if_modified(|state| {
            was_active = state.is_active();
            started = state.revoke();
            was_active || started
        });

        if started {
            warn!("credential rejected by generation service; requesting a new one");
            self.surface.open();
        } else {
            debug!("credential entry already open");
        }
        // The vault must not come back active on restart.
        if was_active {
            if let Err(e) = self.vault.set_activated(false).await {
                error!(error = %e, "failed to deactivate stored credential");
            }
        }
    }

    /// Recomputes the active flag from the vault and host picker.
    ///
    /// A key in the environment is always usable. Otherwise the vault must
    /// be activated and hold a key, or the host picker must have one
    /// selected. Storage and picker failures count as "no credential".
    pub async fn refresh(&self) -> bool {
        let active = self.probe().await;
        self.state
            .send_if_modified(|state| state.set_active(active));
        debug!(active, "credential status refreshed");
        active
    }

    /// Host callback for "a credential became available": refreshes, and
    /// closes the surface if the credential is now usable.
    pub async fn credential_available(&self) -> bool {
        let active = self.refresh().await;
        if active {
            self.dismiss();
        }
        active
    }

    /// Stores a manually entered key, activates it and closes the surface.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::EmptyKey` for an empty key and
    /// `CredentialError::Storage` if the vault cannot be written.
    pub async fn apply_key(&self, key: &str) -> Result<bool, CredentialError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(CredentialError::EmptyKey);
        }
        self.vault.store_key(key).await?;
        self.vault.set_activated(true).await?;
        info!("credential key applied");
        Ok(self.credential_available().await)
    }

    /// Deletes the stored key and refreshes.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::Storage` if the vault cannot be written.
    pub async fn reset_credentials(&self) -> Result<bool, CredentialError> {
        self.vault.remove_key().await?;
        info!("stored credential removed");
        Ok(self.refresh().await)
    }

    /// Opens the credential surface on explicit user request.
    pub fn open_settings(&self) {
        if self.state.send_if_modified(GateState::request_prompt) {
            self.surface.open();
        }
    }

    /// Closes the credential surface.
    pub fn dismiss(&self) {
        if self.state.send_if_modified(GateState::close_prompt) {
            self.surface.close();
        }
    }

    async fn probe(&self) -> bool {
        if self.vault.has_environment_key() {
            return true;
        }

        let activated = read_flag("vault activation", self.vault.is_activated().await);
        let stored = read_flag("stored key", self.vault.has_stored_key().await);
        let selected = match self.surface.has_selected_key().await {
            Ok(selected) => selected,
            Err(e) => {
                warn!(error = %e, "host credential check failed");
                false
            }
        };

        activated && (stored || selected)
    }
}

fn read_flag(what: &str, result: Result<bool, StorageError>) -> bool {
    result.unwrap_or_else(|e| {
        warn!(error = %e, "failed to read {what}");
        false
    })
}

impl std::fmt::Debug for CredentialGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialGate")
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyboard_test_support::{MemoryVault, RecordingSurface};

    fn gate_with(vault: &Arc<MemoryVault>, surface: &Arc<RecordingSurface>) -> CredentialGate {
        CredentialGate::new(
            Arc::clone(vault) as Arc<dyn CredentialVault>,
            Arc::clone(surface) as Arc<dyn CredentialSurface>,
        )
    }

    #[tokio::test]
    async fn test_environment_key_is_always_active() {
        let vault = Arc::new(MemoryVault::with_environment_key());
        let surface = Arc::new(RecordingSurface::new());
        let gate = gate_with(&vault, &surface);

        assert!(gate.refresh().await);
        assert!(gate.ensure_active());
        assert_eq!(surface.open_count(), 0);
    }

    #[tokio::test]
    async fn test_activated_vault_with_key_is_active() {
        let vault = Arc::new(MemoryVault::activated_with_key("AIza-test"));
        let surface = Arc::new(RecordingSurface::new());
        let gate = gate_with(&vault, &surface);

        assert!(gate.refresh().await);
    }

    #[tokio::test]
    async fn test_activated_vault_with_host_selection_is_active() {
        let vault = Arc::new(MemoryVault::new());
        vault.set_activated(true).await.unwrap();
        let surface = Arc::new(RecordingSurface::with_host_selection(true));
        let gate = gate_with(&vault, &surface);

        assert!(gate.refresh().await);
    }

    #[tokio::test]
    async fn test_stored_key_without_activation_is_inactive() {
        let vault = Arc::new(MemoryVault::new());
        vault.store_key("AIza-test").await.unwrap();
        let surface = Arc::new(RecordingSurface::new());
        let gate = gate_with(&vault, &surface);

        assert!(!gate.refresh().await);
    }

    #[tokio::test]
    async fn test_failing_host_probe_counts_as_no_selection() {
        let vault = Arc::new(MemoryVault::new());
        vault.set_activated(true).await.unwrap();
        let surface = Arc::new(RecordingSurface::with_failing_host());
        let gate = gate_with(&vault, &surface);

        assert!(!gate.refresh().await);
    }

    #[tokio::test]
    async fn test_ensure_active_when_inactive_opens_surface_once() {
        // Arrange
        let vault = Arc::new(MemoryVault::new());
        let surface = Arc::new(RecordingSurface::new());
        let gate = gate_with(&vault, &surface);

        // Act
        let first = gate.ensure_active();
        let second = gate.ensure_active();

        // Assert
        assert!(!first);
        assert!(!second);
        assert_eq!(surface.open_count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_failures_start_one_recovery_flow() {
        // Arrange
        let vault = Arc::new(MemoryVault::activated_with_key("AIza-test"));
        let surface = Arc::new(RecordingSurface::new());
        let gate = gate_with(&vault, &surface);
        gate.refresh().await;

        // Act
        tokio::join!(gate.mark_failed(), gate.mark_failed());

        // Assert
        assert_eq!(surface.open_count(), 1);
        assert!(!gate.is_active());
        assert!(!vault.activated());
        assert!(!gate.ensure_active());
        assert_eq!(surface.open_count(), 1);
    }

    #[tokio::test]
    async fn test_failure_with_settings_already_open_still_deactivates_vault() {
        // Arrange
        let vault = Arc::new(MemoryVault::activated_with_key("AIza-test"));
        let surface = Arc::new(RecordingSurface::new());
        let gate = gate_with(&vault, &surface);
        gate.refresh().await;
        gate.open_settings();

        // Act
        gate.mark_failed().await;

        // Assert
        assert!(!gate.is_active());
        assert!(!vault.activated());
        assert_eq!(surface.open_count(), 1);
        assert!(!gate.refresh().await);
    }

    #[tokio::test]
    async fn test_apply_key_activates_and_closes_surface() {
        // Arrange
        let vault = Arc::new(MemoryVault::new());
        let surface = Arc::new(RecordingSurface::new());
        let gate = gate_with(&vault, &surface);
        gate.ensure_active();

        // Act
        let active = gate.apply_key("  AIza-new  ").await.unwrap();

        // Assert
        assert!(active);
        assert!(gate.is_active());
        assert_eq!(vault.stored_key().as_deref(), Some("AIza-new"));
        assert!(vault.activated());
        assert_eq!(surface.close_count(), 1);
    }

    #[tokio::test]
    async fn test_apply_empty_key_is_rejected() {
        let vault = Arc::new(MemoryVault::new());
        let surface = Arc::new(RecordingSurface::new());
        let gate = gate_with(&vault, &surface);

        let result = gate.apply_key("   ").await;

        assert!(matches!(result, Err(CredentialError::EmptyKey)));
        assert_eq!(vault.stored_key(), None);
    }

    #[tokio::test]
    async fn test_recovery_completes_when_credential_becomes_available() {
        let vault = Arc::new(MemoryVault::activated_with_key("AIza-old"));
        let surface = Arc::new(RecordingSurface::new());
        let gate = gate_with(&vault, &surface);
        gate.refresh().await;
        gate.mark_failed().await;

        gate.apply_key("AIza-new").await.unwrap();

        assert!(gate.is_active());
        assert!(!gate.subscribe().borrow().is_prompt_open());
    }

    #[tokio::test]
    async fn test_reset_credentials_deactivates_gate() {
        let vault = Arc::new(MemoryVault::activated_with_key("AIza-test"));
        let surface = Arc::new(RecordingSurface::new());
        let gate = gate_with(&vault, &surface);
        gate.refresh().await;

        let active = gate.reset_credentials().await.unwrap();

        assert!(!active);
        assert_eq!(vault.stored_key(), None);
    }

    #[tokio::test]
    async fn test_open_settings_and_dismiss_toggle_surface_once() {
        let vault = Arc::new(MemoryVault::new());
        let surface = Arc::new(RecordingSurface::new());
        let gate = gate_with(&vault, &surface);

        gate.open_settings();
        gate.open_settings();
        gate.dismiss();
        gate.dismiss();

        assert_eq!(surface.open_count(), 1);
        assert_eq!(surface.close_count(), 1);
    }
}
