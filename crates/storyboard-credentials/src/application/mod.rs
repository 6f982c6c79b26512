//! Application services for the Credential context.

pub mod gate;
