//! Storyboard Core — shared domain abstractions.
//!
//! This crate defines the traits and value types that the history, credential
//! and scene crates depend on: the collaborator contracts for the external
//! generation service, durable key-value storage and credential entry, plus
//! the error taxonomy shared between them. It contains no infrastructure code.

pub mod clock;
pub mod command;
pub mod credential;
pub mod error;
pub mod ids;
pub mod service;
pub mod storage;
pub mod story;
