//! Storyboard generator — studio error types.

use storyboard_core::error::StorageError;
use thiserror::Error;

/// An environment variable holds a value that cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The variable is set but its value is invalid.
    #[error("invalid value for {var}: {reason}")]
    Invalid {
        /// Variable name.
        var: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Startup errors for the studio.
#[derive(Debug, Error)]
pub enum StudioError {
    /// Configuration could not be read.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The data directory could not be prepared.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
