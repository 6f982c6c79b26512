//! Storyboard generator — Credential context.
//!
//! Tracks whether a usable credential is active, gates generation requests
//! on it, and runs the re-entry flow when the generation service rejects the
//! active credential.

pub mod application;
pub mod domain;

pub use application::gate::CredentialGate;
pub use domain::state::{Admission, GateState};
