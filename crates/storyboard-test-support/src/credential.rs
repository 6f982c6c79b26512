//! Test credential doubles — in-memory vault and recording surface.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use storyboard_core::credential::{CredentialSurface, CredentialVault};
use storyboard_core::error::{CredentialError, StorageError};

/// A vault kept entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryVault {
    environment_key: bool,
    activated: AtomicBool,
    key: Mutex<Option<String>>,
}

impl MemoryVault {
    /// An empty, deactivated vault.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A vault whose process environment supplies a key.
    #[must_use]
    pub fn with_environment_key() -> Self {
        Self {
            environment_key: true,
            ..Self::default()
        }
    }

    /// An activated vault holding `key`.
    #[must_use]
    pub fn activated_with_key(key: &str) -> Self {
        Self {
            environment_key: false,
            activated: AtomicBool::new(true),
            key: Mutex::new(Some(key.to_owned())),
        }
    }

    /// Current activation flag.
    pub fn activated(&self) -> bool {
        self.activated.load(Ordering::SeqCst)
    }

    /// Currently stored key.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn stored_key(&self) -> Option<String> {
        self.key.lock().unwrap().clone()
    }
}

#[async_trait]
impl CredentialVault for MemoryVault {
    fn has_environment_key(&self) -> bool {
        self.environment_key
    }

    async fn is_activated(&self) -> Result<bool, StorageError> {
        Ok(self.activated())
    }

    async fn set_activated(&self, activated: bool) -> Result<(), StorageError> {
        self.activated.store(activated, Ordering::SeqCst);
        Ok(())
    }

    async fn has_stored_key(&self) -> Result<bool, StorageError> {
        Ok(self.key.lock().unwrap().is_some())
    }

    async fn store_key(&self, key: &str) -> Result<(), StorageError> {
        *self.key.lock().unwrap() = Some(key.to_owned());
        Ok(())
    }

    async fn remove_key(&self) -> Result<(), StorageError> {
        *self.key.lock().unwrap() = None;
        Ok(())
    }
}

/// A credential surface that counts open and close requests.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    opened: AtomicUsize,
    closed: AtomicUsize,
    host_selection: Mutex<Option<Result<bool, String>>>,
}

impl RecordingSurface {
    /// A surface without a host picker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A surface whose host picker reports `selected`.
    #[must_use]
    pub fn with_host_selection(selected: bool) -> Self {
        Self {
            host_selection: Mutex::new(Some(Ok(selected))),
            ..Self::default()
        }
    }

    /// A surface whose host picker probe fails.
    #[must_use]
    pub fn with_failing_host() -> Self {
        Self {
            host_selection: Mutex::new(Some(Err("picker unavailable".to_owned()))),
            ..Self::default()
        }
    }

    /// Number of `open` calls so far.
    pub fn open_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Number of `close` calls so far.
    pub fn close_count(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialSurface for RecordingSurface {
    fn open(&self) {
        self.opened.fetch_add(1, Ordering::SeqCst);
    }

    fn close(&self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }

    async fn has_selected_key(&self) -> Result<bool, CredentialError> {
        match self.host_selection.lock().unwrap().clone() {
            None => Ok(false),
            Some(Ok(selected)) => Ok(selected),
            Some(Err(message)) => Err(CredentialError::Host(message)),
        }
    }
}
