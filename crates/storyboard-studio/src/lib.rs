//! Storyboard generator — composition root.
//!
//! Reads configuration from the environment, initialises tracing, and wires
//! the file-backed store, credential vault, credential gate, history store
//! and scene orchestrator into one [`Studio`] context object. The generation
//! service and the credential-entry surface are supplied by the host.

pub mod config;
pub mod error;
pub mod file_store;
pub mod studio;
pub mod telemetry;
pub mod vault;

pub use config::StudioConfig;
pub use error::{ConfigError, StudioError};
pub use file_store::FileStore;
pub use studio::Studio;
pub use vault::StoredCredentialVault;
