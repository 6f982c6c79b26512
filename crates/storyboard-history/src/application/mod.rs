//! Application services for the History context.

pub mod persistence;
pub mod store;
