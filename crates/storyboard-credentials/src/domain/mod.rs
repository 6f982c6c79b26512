//! Domain model for the Credential context.

pub mod state;
