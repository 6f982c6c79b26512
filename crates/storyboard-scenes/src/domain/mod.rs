//! Domain model for the Scene Generation context.

pub mod board;
pub mod commands;
pub mod scene;
