//! Domain model for the History context.

pub mod item;
pub mod log;
