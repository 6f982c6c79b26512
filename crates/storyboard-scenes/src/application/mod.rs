//! Application services for the Scene Generation context.

pub mod orchestrator;
