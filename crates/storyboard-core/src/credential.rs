//! Credential collaborator abstractions.
//!
//! The credential material itself never passes through the gate; the gate
//! only asks the vault whether usable material exists and asks the surface
//! to prompt the user when it does not.

use async_trait::async_trait;

use crate::error::{CredentialError, StorageError};

/// Storage for credential material and the "vault activated" flag.
#[async_trait]
pub trait CredentialVault: Send + Sync {
    /// Returns `true` if the process environment supplies a key. Such a key
    /// is always considered usable.
    fn has_environment_key(&self) -> bool;

    /// Whether the user has activated the stored credential.
    async fn is_activated(&self) -> Result<bool, StorageError>;

    /// Sets the activation flag.
    async fn set_activated(&self, activated: bool) -> Result<(), StorageError>;

    /// Whether a manually entered key is stored.
    async fn has_stored_key(&self) -> Result<bool, StorageError>;

    /// Stores a manually entered key.
    async fn store_key(&self, key: &str) -> Result<(), StorageError>;

    /// Deletes the stored key.
    async fn remove_key(&self) -> Result<(), StorageError>;
}

/// The credential-entry surface: a prompt dialog or a host-provided picker.
#[async_trait]
pub trait CredentialSurface: Send + Sync {
    /// Asks the user (or host) to supply a credential.
    fn open(&self);

    /// Closes the surface.
    fn close(&self);

    /// Whether the host picker already has a key selected. Hosts without a
    /// picker report `false`.
    async fn has_selected_key(&self) -> Result<bool, CredentialError> {
        Ok(false)
    }
}
