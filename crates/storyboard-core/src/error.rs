//! Domain error types.

use thiserror::Error;

/// Substring the generation service uses when the active credential no
/// longer resolves to a usable project or key.
pub const ENTITY_NOT_FOUND_SIGNATURE: &str = "Requested entity was not found";

/// Failure of a call to the external generation service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The active credential was rejected. Triggers credential recovery.
    #[error("authorization failure: {0}")]
    Authorization(String),

    /// Any other failure reported by the service.
    #[error("generation service error: {0}")]
    Service(String),

    /// The service answered with something that could not be interpreted.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl GenerationError {
    /// Classifies a raw error message reported by the generation service.
    ///
    /// Messages carrying the "entity not found" signature become
    /// [`GenerationError::Authorization`]; everything else is an ordinary
    /// [`GenerationError::Service`] failure.
    #[must_use]
    pub fn from_service_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.contains(ENTITY_NOT_FOUND_SIGNATURE) {
            Self::Authorization(message)
        } else {
            Self::Service(message)
        }
    }

    /// Returns `true` when this failure means the credential must be re-entered.
    #[must_use]
    pub fn is_authorization_failure(&self) -> bool {
        matches!(self, Self::Authorization(_))
    }
}

/// Failure of the durable key-value storage surface.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The underlying medium could not be read or written.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored value exists but could not be decoded.
    #[error("corrupt stored value under {key}: {reason}")]
    Corrupt {
        /// The storage key holding the bad value.
        key: String,
        /// Decoder message.
        reason: String,
    },
}

/// Failure while acquiring or managing a credential.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// An empty key was submitted.
    #[error("credential key must not be empty")]
    EmptyKey,

    /// The credential vault could not be read or written.
    #[error("credential storage error: {0}")]
    Storage(#[from] StorageError),

    /// The host-provided credential picker failed.
    #[error("host credential picker error: {0}")]
    Host(String),
}
